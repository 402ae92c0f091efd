//! Sumo
//!
//! Two round wrestlers push each other inside a circular ring. Movement is
//! accelerate-then-damp, a dash gives a short burst along the facing angle,
//! and leaving the ring loses the round.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::input::Action;
use crate::settings::PlayerMode;
use crate::sim::body::{Body, FrictionParams, apply_friction, clamp_speed};
use crate::sim::collision::{outside_ring, resolve_circle_pair};
use crate::sim::dash::{DashPhase, DashState, DashTimings};
use crate::sim::opponent::ChaseAi;
use crate::sim::{EndCause, EntityKind, EntityView, Game, RoundProfile, StepInput, StepOutcome};
use crate::Player;

/// Sumo tuning (speeds per reference frame)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SumoConfig {
    /// Ring radius as a fraction of the shorter field side
    pub arena_ratio: f32,
    pub player_radius: f32,
    pub speed: f32,
    pub friction: FrictionParams,
    pub dash: DashTimings,
    pub ai: ChaseAi,
}

impl Default for SumoConfig {
    fn default() -> Self {
        Self {
            arena_ratio: 0.4,
            player_radius: 30.0,
            speed: 5.0,
            friction: FrictionParams {
                accel: 10.0,
                damping: 0.9,
            },
            dash: DashTimings::default(),
            ai: ChaseAi::default(),
        }
    }
}

impl SumoConfig {
    /// Fastest a wrestler may move: a full dash
    pub fn max_speed(&self) -> f32 {
        self.speed * self.dash.speed_multiplier
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wrestler {
    pub body: Body,
    /// Radians, 0 = facing right
    pub facing: f32,
    pub dash: DashState,
}

/// Steering for one tick
#[derive(Debug, Clone, Copy, Default)]
struct Intent {
    push: Vec2,
    dash: bool,
}

#[derive(Debug, Clone)]
pub struct SumoGame {
    config: SumoConfig,
    center: Vec2,
    arena_radius: f32,
    wrestlers: [Wrestler; 2],
}

impl SumoGame {
    pub fn new(config: SumoConfig, width: f32, height: f32) -> Self {
        let wrestler = Wrestler {
            body: Body::circle(Vec2::ZERO, config.player_radius),
            facing: 0.0,
            dash: DashState::default(),
        };
        Self {
            config,
            center: Vec2::new(width / 2.0, height / 2.0),
            arena_radius: config.arena_ratio * width.min(height),
            wrestlers: [wrestler; 2],
        }
    }

    pub fn config(&self) -> &SumoConfig {
        &self.config
    }

    pub fn arena_center(&self) -> Vec2 {
        self.center
    }

    pub fn arena_radius(&self) -> f32 {
        self.arena_radius
    }

    pub fn wrestler(&self, player: Player) -> &Wrestler {
        &self.wrestlers[player.index()]
    }

    pub fn wrestler_mut(&mut self, player: Player) -> &mut Wrestler {
        &mut self.wrestlers[player.index()]
    }

    fn human_intent(&self, step: &mut StepInput<'_>, player: Player) -> Intent {
        Intent {
            push: step.input.axis(player) * self.config.speed,
            dash: step.input.take_press(player, Action::Confirm),
        }
    }

    fn ai_intent(&self, player: Player) -> Intent {
        let me = &self.wrestlers[player.index()];
        let target = self.wrestlers[player.other().index()].body.pos;
        let ai = &self.config.ai;
        Intent {
            push: ai.seek(me.body.pos, target) * self.config.speed,
            dash: ai.wants_dash(me.body.pos, target, me.dash.is_ready()),
        }
    }

    fn drive(&mut self, player: Player, intent: Intent, dt: f32) {
        let cfg = self.config;
        let w = &mut self.wrestlers[player.index()];

        if w.dash.update(dt, &cfg.dash) == Some(DashPhase::Cooldown) {
            w.body.vel = Vec2::ZERO;
        }
        if intent.dash && w.dash.trigger(&cfg.dash) {
            log::debug!("{:?} dash", player);
        }

        match w.dash.phase() {
            DashPhase::Charging => w.body.vel = Vec2::ZERO,
            DashPhase::Dashing => {
                w.body.vel = Vec2::from_angle(w.facing) * cfg.max_speed();
            }
            DashPhase::Ready | DashPhase::Cooldown => {
                if intent.push != Vec2::ZERO {
                    w.facing = intent.push.y.atan2(intent.push.x);
                }
                apply_friction(&mut w.body, intent.push, &cfg.friction, dt);
                w.body.vel = clamp_speed(w.body.vel, cfg.max_speed());
            }
        }
        w.body.advance(dt);
    }

    fn ring_out(&self) -> Option<Player> {
        Player::ALL.into_iter().find(|&p| {
            let body = &self.wrestlers[p.index()].body;
            outside_ring(body.pos, body.radius(), self.center, self.arena_radius)
        })
    }
}

impl Game for SumoGame {
    fn name(&self) -> &'static str {
        "sumo"
    }

    fn profile(&self) -> RoundProfile {
        RoundProfile::default()
    }

    fn reset(&mut self, _mode: PlayerMode, _rng: &mut Pcg32) {
        let offset = Vec2::new(self.arena_radius / 2.0, 0.0);
        for (player, (pos, facing)) in Player::ALL.into_iter().zip([
            (self.center - offset, 0.0),
            (self.center + offset, std::f32::consts::PI),
        ]) {
            let w = &mut self.wrestlers[player.index()];
            w.body.pos = pos;
            w.body.vel = Vec2::ZERO;
            w.facing = facing;
            w.dash.reset();
        }
    }

    fn step(&mut self, step: &mut StepInput<'_>) -> StepOutcome {
        let intents = [
            self.human_intent(step, Player::One),
            if step.mode.is_versus() {
                self.human_intent(step, Player::Two)
            } else {
                self.ai_intent(Player::Two)
            },
        ];
        for player in Player::ALL {
            self.drive(player, intents[player.index()], step.dt);
        }

        let [a, b] = &mut self.wrestlers;
        if resolve_circle_pair(&mut a.body, &mut b.body).hit {
            log::trace!("bump");
        }

        let mut outcome = StepOutcome::default();
        if let Some(loser) = self.ring_out() {
            let winner = loser.other();
            log::debug!("{:?} ring out", loser);
            outcome.points.push((winner, 1));
            outcome.end = Some((EndCause::RingOut, Some(winner)));
        }
        outcome
    }

    fn entities(&self) -> Vec<EntityView> {
        let mut views = vec![EntityView::new(
            2,
            EntityKind::Arena,
            None,
            Body::circle(self.center, self.arena_radius),
        )];
        for player in Player::ALL {
            let w = &self.wrestlers[player.index()];
            let mut view =
                EntityView::new(player.index() as u32, EntityKind::Avatar, Some(player), w.body);
            view.facing = Some(w.facing);
            view.dash = Some(w.dash.phase());
            views.push(view);
        }
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::input::InputState;
    use rand::SeedableRng;

    fn setup() -> (SumoGame, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut game = SumoGame::new(SumoConfig::default(), 960.0, 540.0);
        game.reset(PlayerMode::Versus, &mut rng);
        (game, rng)
    }

    fn tick(
        game: &mut SumoGame,
        input: &mut InputState,
        rng: &mut Pcg32,
        mode: PlayerMode,
    ) -> StepOutcome {
        game.step(&mut StepInput {
            input,
            mode,
            rng,
            dt: SIM_DT,
        })
    }

    #[test]
    fn test_start_positions() {
        let (game, _) = setup();
        assert!((game.arena_radius() - 216.0).abs() < 1e-4);
        assert_eq!(game.wrestler(Player::One).body.pos, Vec2::new(372.0, 270.0));
        assert_eq!(game.wrestler(Player::Two).body.pos, Vec2::new(588.0, 270.0));
    }

    #[test]
    fn test_idle_wrestlers_stay_put() {
        let (mut game, mut rng) = setup();
        let mut input = InputState::new();
        for _ in 0..120 {
            assert!(tick(&mut game, &mut input, &mut rng, PlayerMode::Versus).end.is_none());
        }
        assert_eq!(game.wrestler(Player::One).body.pos, Vec2::new(372.0, 270.0));
    }

    #[test]
    fn test_input_sets_facing_and_moves() {
        let (mut game, mut rng) = setup();
        let mut input = InputState::new();
        input.set(Player::One, Action::Down, true);
        for _ in 0..10 {
            tick(&mut game, &mut input, &mut rng, PlayerMode::Versus);
        }
        let w = game.wrestler(Player::One);
        assert!((w.facing - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!(w.body.pos.y > 270.0);
    }

    #[test]
    fn test_dash_holds_then_bursts() {
        let (mut game, mut rng) = setup();
        let mut input = InputState::new();
        input.set(Player::One, Action::Confirm, true);
        tick(&mut game, &mut input, &mut rng, PlayerMode::Versus);
        assert_eq!(game.wrestler(Player::One).dash.phase(), DashPhase::Charging);
        assert_eq!(game.wrestler(Player::One).body.vel, Vec2::ZERO);

        // Charge is 0.1 s: dashing within 7 ticks, at 3x speed toward player two
        for _ in 0..7 {
            input.end_tick();
            tick(&mut game, &mut input, &mut rng, PlayerMode::Versus);
        }
        let w = game.wrestler(Player::One);
        assert_eq!(w.dash.phase(), DashPhase::Dashing);
        assert!((w.body.vel - Vec2::new(15.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_dash_cooldown_blocks_retrigger() {
        let (mut game, mut rng) = setup();
        game.wrestler_mut(Player::One).dash.trigger(&DashTimings::default());
        let mut input = InputState::new();
        let mut seen_cooldown = false;
        for _ in 0..60 {
            tick(&mut game, &mut input, &mut rng, PlayerMode::Versus);
            if game.wrestler(Player::One).dash.phase() == DashPhase::Cooldown {
                seen_cooldown = true;
                input.set(Player::One, Action::Confirm, false);
                input.set(Player::One, Action::Confirm, true);
                tick(&mut game, &mut input, &mut rng, PlayerMode::Versus);
                assert_ne!(game.wrestler(Player::One).dash.phase(), DashPhase::Charging);
                break;
            }
        }
        assert!(seen_cooldown);
    }

    #[test]
    fn test_head_on_bump_swaps() {
        let (mut game, mut rng) = setup();
        let c = game.arena_center();
        {
            let a = game.wrestler_mut(Player::One);
            a.body.pos = c - Vec2::new(29.0, 0.0);
            a.body.vel = Vec2::new(1.0, 0.0);
        }
        {
            let b = game.wrestler_mut(Player::Two);
            b.body.pos = c + Vec2::new(29.0, 0.0);
            b.body.vel = Vec2::new(-1.0, 0.0);
        }
        let mut input = InputState::new();
        tick(&mut game, &mut input, &mut rng, PlayerMode::Versus);
        let a = game.wrestler(Player::One).body;
        let b = game.wrestler(Player::Two).body;
        assert!((a.pos.distance(b.pos) - 60.0).abs() < 1e-3);
        assert!(a.vel.x < 0.0 && b.vel.x > 0.0);
        assert!((a.vel.x + b.vel.x).abs() < 1e-5);
    }

    #[test]
    fn test_ring_out_awards_other_player() {
        let (mut game, mut rng) = setup();
        let c = game.arena_center();
        game.wrestler_mut(Player::Two).body.pos = c + Vec2::new(200.0, 0.0);
        let mut input = InputState::new();
        let outcome = tick(&mut game, &mut input, &mut rng, PlayerMode::Versus);
        assert_eq!(outcome.points, vec![(Player::One, 1)]);
        assert_eq!(outcome.end, Some((EndCause::RingOut, Some(Player::One))));
    }

    #[test]
    fn test_ai_closes_in() {
        let (mut game, mut rng) = setup();
        let mut input = InputState::new();
        let start = game
            .wrestler(Player::One)
            .body
            .pos
            .distance(game.wrestler(Player::Two).body.pos);
        for _ in 0..30 {
            tick(&mut game, &mut input, &mut rng, PlayerMode::Single);
        }
        let now = game
            .wrestler(Player::One)
            .body
            .pos
            .distance(game.wrestler(Player::Two).body.pos);
        assert!(now < start);
    }
}
