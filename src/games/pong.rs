//! Pong
//!
//! Paddles sit on the left and right edges. The ball bounces off the top and
//! bottom, speeds up on every paddle hit and scores for the opposite player
//! when it leaves through a side. In single mode player two is the computer.

use std::f32::consts::FRAC_PI_4;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::input::Action;
use crate::settings::PlayerMode;
use crate::sim::body::{Aabb, Body};
use crate::sim::collision::{BounceParams, circle_hits_box, paddle_bounce, reflect_off_walls};
use crate::sim::opponent::{PaddleAi, predict_intercept_y};
use crate::sim::{EndCause, EntityKind, EntityView, Game, RoundProfile, StepInput, StepOutcome};
use crate::{Player, frame_scale};

/// What a goal does to the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPolicy {
    /// The goal ends the round (`Scored`, scorer wins)
    #[default]
    EndRound,
    /// Re-serve from the centre and keep playing
    Serve,
}

/// Pong tuning. Sizes are fractions of the field; speeds are per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PongConfig {
    pub paddle_height_ratio: f32,
    pub paddle_width_ratio: f32,
    pub ball_radius_ratio: f32,
    pub serve_speed: f32,
    /// Serve angle is uniform in ±this (radians)
    pub serve_spread: f32,
    pub paddle_speed: f32,
    pub bounce: BounceParams,
    pub ai: PaddleAi,
    pub goal_policy: GoalPolicy,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            paddle_height_ratio: 1.0 / 6.0,
            paddle_width_ratio: 1.0 / 80.0,
            ball_radius_ratio: 1.0 / 100.0,
            serve_speed: 8.0,
            serve_spread: FRAC_PI_4,
            paddle_speed: 7.0,
            bounce: BounceParams {
                max_angle: FRAC_PI_4,
                growth: 1.12,
                max_speed: 20.0,
            },
            ai: PaddleAi::default(),
            goal_policy: GoalPolicy::EndRound,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PongGame {
    config: PongConfig,
    width: f32,
    height: f32,
    paddles: [Body; 2],
    ball: Body,
    /// Scalar ball speed; direction lives in `ball.vel`
    speed: f32,
    /// Paddle hits since the last serve
    hits: u32,
}

impl PongGame {
    pub fn new(config: PongConfig, width: f32, height: f32) -> Self {
        let paddle = Body::rect(
            Vec2::ZERO,
            width * config.paddle_width_ratio,
            height * config.paddle_height_ratio,
        );
        Self {
            config,
            width,
            height,
            paddles: [paddle; 2],
            ball: Body::circle(Vec2::ZERO, width * config.ball_radius_ratio),
            speed: config.serve_speed,
            hits: 0,
        }
    }

    pub fn config(&self) -> &PongConfig {
        &self.config
    }

    pub fn ball(&self) -> &Body {
        &self.ball
    }

    pub fn ball_mut(&mut self) -> &mut Body {
        &mut self.ball
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn paddle(&self, player: Player) -> &Body {
        &self.paddles[player.index()]
    }

    pub fn paddle_mut(&mut self, player: Player) -> &mut Body {
        &mut self.paddles[player.index()]
    }

    fn place_paddles(&mut self) {
        for player in Player::ALL {
            let paddle = &mut self.paddles[player.index()];
            let size = paddle.size();
            let x = match player {
                Player::One => 0.0,
                Player::Two => self.width - size.x,
            };
            paddle.pos = Vec2::new(x, (self.height - size.y) / 2.0);
            paddle.vel = Vec2::ZERO;
        }
    }

    /// Centre the ball and send it toward a random side at a random angle
    fn serve(&mut self, rng: &mut Pcg32) {
        self.ball.pos = Vec2::new(self.width / 2.0, self.height / 2.0);
        self.speed = self.config.serve_speed;
        self.hits = 0;
        let spread = self.config.serve_spread;
        let angle = if spread > 0.0 {
            rng.random_range(-spread..spread)
        } else {
            0.0
        };
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.ball.vel = Vec2::new(
            direction * self.speed * angle.cos(),
            self.speed * angle.sin(),
        );
    }

    /// -1 up, 0, 1 down. Up wins when both are held.
    fn human_dir(step: &StepInput<'_>, player: Player) -> f32 {
        if step.input.is_down(player, Action::Up) {
            -1.0
        } else if step.input.is_down(player, Action::Down) {
            1.0
        } else {
            0.0
        }
    }

    fn ai_dir(&self) -> f32 {
        let paddle = &self.paddles[Player::Two.index()];
        let target = predict_intercept_y(self.ball.pos, self.ball.vel, paddle.pos.x, self.height);
        self.config
            .ai
            .steer(paddle.center().y, paddle.size().y, target)
    }

    fn move_paddle(&mut self, player: Player, dir: f32, speed: f32, dt: f32) {
        let delta = speed * frame_scale(dt);
        let height = self.height;
        let paddle = &mut self.paddles[player.index()];
        let h = paddle.size().y;
        if dir < 0.0 && paddle.pos.y > 0.0 {
            paddle.pos.y -= delta;
        } else if dir > 0.0 && paddle.pos.y + h < height {
            paddle.pos.y += delta;
        }
    }

    /// Bounce off whichever paddle guards the half the ball is in.
    ///
    /// A returned ball is moved clear of the paddle face, so a fast ball that
    /// ended the move inside the paddle column is not also counted as a goal.
    fn check_paddle(&mut self) -> bool {
        let (player, direction) = if self.ball.pos.x < self.width / 2.0 {
            (Player::One, 1.0)
        } else {
            (Player::Two, -1.0)
        };
        // A ball already heading away cannot be hit again
        let incoming = self.ball.vel.x * direction < 0.0;
        let paddle: Aabb = self.paddles[player.index()].aabb();
        if !incoming || !circle_hits_box(self.ball.pos, self.ball.radius(), &paddle) {
            return false;
        }
        self.speed = paddle_bounce(
            &mut self.ball,
            self.speed,
            &paddle,
            direction,
            &self.config.bounce,
        );
        let r = self.ball.radius();
        self.ball.pos.x = match player {
            Player::One => paddle.max.x + r,
            Player::Two => paddle.min.x - r,
        };
        self.hits += 1;
        log::debug!("{:?} hit, speed {:.2}", player, self.speed);
        true
    }

    /// Scoring player if the ball left through a side
    fn goal(&self) -> Option<Player> {
        let r = self.ball.radius();
        if self.ball.pos.x - r < 0.0 {
            Some(Player::Two)
        } else if self.ball.pos.x + r > self.width {
            Some(Player::One)
        } else {
            None
        }
    }
}

impl Game for PongGame {
    fn name(&self) -> &'static str {
        "pong"
    }

    fn profile(&self) -> RoundProfile {
        RoundProfile {
            restart_mid_round: true,
            ..Default::default()
        }
    }

    fn reset(&mut self, _mode: PlayerMode, rng: &mut Pcg32) {
        self.place_paddles();
        self.serve(rng);
    }

    fn step(&mut self, step: &mut StepInput<'_>) -> StepOutcome {
        let dt = step.dt;
        let paddle_speed = self.config.paddle_speed;

        let dir = Self::human_dir(step, Player::One);
        self.move_paddle(Player::One, dir, paddle_speed, dt);
        if step.mode.is_versus() {
            let dir = Self::human_dir(step, Player::Two);
            self.move_paddle(Player::Two, dir, paddle_speed, dt);
        } else {
            let dir = self.ai_dir();
            self.move_paddle(Player::Two, dir, self.config.ai.speed, dt);
        }

        self.ball.advance(dt);
        reflect_off_walls(&mut self.ball, 0.0, self.height);
        self.check_paddle();

        let mut outcome = StepOutcome::default();
        if let Some(scorer) = self.goal() {
            log::debug!("{:?} scored", scorer);
            outcome.points.push((scorer, 1));
            match self.config.goal_policy {
                GoalPolicy::EndRound => outcome.end = Some((EndCause::Scored, Some(scorer))),
                GoalPolicy::Serve => {
                    self.place_paddles();
                    self.serve(step.rng);
                }
            }
        }
        outcome
    }

    fn entities(&self) -> Vec<EntityView> {
        let mut views: Vec<EntityView> = Player::ALL
            .into_iter()
            .map(|p| {
                let paddle = self.paddles[p.index()];
                EntityView::new(p.index() as u32, EntityKind::Paddle, Some(p), paddle)
            })
            .collect();
        views.push(EntityView::new(2, EntityKind::Ball, None, self.ball));
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::input::InputState;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn setup(config: PongConfig) -> (PongGame, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut game = PongGame::new(config, 960.0, 540.0);
        game.reset(PlayerMode::Versus, &mut rng);
        (game, rng)
    }

    fn tick(
        game: &mut PongGame,
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
    fn test_layout_from_field_size() {
        let (game, _) = setup(PongConfig::default());
        assert_eq!(game.paddle(Player::One).size(), Vec2::new(12.0, 90.0));
        assert_eq!(game.paddle(Player::One).pos, Vec2::new(0.0, 225.0));
        assert_eq!(game.paddle(Player::Two).pos, Vec2::new(948.0, 225.0));
        assert!((game.ball().radius() - 9.6).abs() < 1e-5);
        assert_eq!(game.ball().pos, Vec2::new(480.0, 270.0));
        assert!((game.ball().vel.length() - 8.0).abs() < 1e-4);
        let angle = (game.ball().vel.y / game.ball().vel.x.abs()).atan();
        assert!(angle.abs() <= FRAC_PI_4 + 1e-5);
    }

    #[test]
    fn test_dead_center_return() {
        let (mut game, mut rng) = setup(PongConfig::default());
        let mut input = InputState::new();
        // Ball just left of player two's paddle, level with its centre
        game.ball_mut().pos = Vec2::new(932.0, 270.0);
        game.ball_mut().vel = Vec2::new(8.0, 0.0);
        tick(&mut game, &mut input, &mut rng, PlayerMode::Versus);
        assert_eq!(game.hits(), 1);
        assert!((game.speed() - 8.96).abs() < 1e-4);
        assert!((game.ball().vel.x + 8.96).abs() < 1e-4);
        assert!(game.ball().vel.y.abs() < 1e-4);
    }

    #[test]
    fn test_fast_return_near_edge_is_not_a_goal() {
        let (mut game, mut rng) = setup(PongConfig::default());
        let mut input = InputState::new();
        game.set_speed(15.0);
        // One tick carries the ball into player one's paddle column
        game.ball_mut().pos = Vec2::new(22.0, 270.0);
        game.ball_mut().vel = Vec2::new(-15.0, 0.0);
        let outcome = tick(&mut game, &mut input, &mut rng, PlayerMode::Versus);
        assert_eq!(game.hits(), 1);
        assert!(outcome.points.is_empty());
        assert!(outcome.end.is_none());
        assert!(game.ball().vel.x > 0.0);
        assert!((game.ball().pos.x - 21.6).abs() < 1e-4);
    }

    #[test]
    fn test_outgoing_ball_not_hit_twice() {
        let (mut game, mut rng) = setup(PongConfig::default());
        let mut input = InputState::new();
        game.ball_mut().pos = Vec2::new(945.0, 270.0);
        game.ball_mut().vel = Vec2::new(-2.0, 0.0);
        tick(&mut game, &mut input, &mut rng, PlayerMode::Versus);
        assert_eq!(game.hits(), 0);
        assert_eq!(game.speed(), 8.0);
    }

    #[test]
    fn test_goal_ends_round_for_scorer() {
        let (mut game, mut rng) = setup(PongConfig::default());
        let mut input = InputState::new();
        game.ball_mut().pos = Vec2::new(480.0, 270.0);
        game.ball_mut().vel = Vec2::new(-20.0, 0.0);
        // Move player one's paddle out of the way
        game.paddle_mut(Player::One).pos.y = 0.0;
        let end = (0..100).find_map(|_| {
            let outcome = tick(&mut game, &mut input, &mut rng, PlayerMode::Versus);
            if outcome.end.is_some() {
                assert_eq!(outcome.points, vec![(Player::Two, 1)]);
            }
            outcome.end
        });
        assert_eq!(end, Some((EndCause::Scored, Some(Player::Two))));
    }

    #[test]
    fn test_serve_policy_keeps_playing() {
        let config = PongConfig {
            goal_policy: GoalPolicy::Serve,
            ..Default::default()
        };
        let (mut game, mut rng) = setup(config);
        let mut input = InputState::new();
        game.ball_mut().pos = Vec2::new(950.0, 20.0);
        game.ball_mut().vel = Vec2::new(15.0, 0.0);
        let outcome = tick(&mut game, &mut input, &mut rng, PlayerMode::Versus);
        assert_eq!(outcome.points, vec![(Player::One, 1)]);
        assert!(outcome.end.is_none());
        assert_eq!(game.ball().pos, Vec2::new(480.0, 270.0));
        assert_eq!(game.speed(), 8.0);
    }

    #[test]
    fn test_paddles_stay_in_field() {
        let (mut game, mut rng) = setup(PongConfig::default());
        let mut input = InputState::new();
        input.set(Player::One, Action::Up, true);
        input.set(Player::Two, Action::Down, true);
        game.ball_mut().vel = Vec2::ZERO;
        for _ in 0..200 {
            tick(&mut game, &mut input, &mut rng, PlayerMode::Versus);
        }
        // Gated before moving, so at most one step past the edge
        assert!(game.paddle(Player::One).pos.y > -7.0 - 1e-3);
        assert!(game.paddle(Player::Two).pos.y + 90.0 < 540.0 + 7.0 + 1e-3);
    }

    #[test]
    fn test_ai_tracks_incoming_ball() {
        let (mut game, mut rng) = setup(PongConfig::default());
        let mut input = InputState::new();
        game.ball_mut().pos = Vec2::new(480.0, 100.0);
        game.ball_mut().vel = Vec2::new(6.0, 0.0);
        let start = game.paddle(Player::Two).pos.y;
        for _ in 0..20 {
            tick(&mut game, &mut input, &mut rng, PlayerMode::Single);
        }
        assert!(game.paddle(Player::Two).pos.y < start);
    }

    #[test]
    fn test_ai_holds_when_ball_has_no_horizontal_speed() {
        let (mut game, mut rng) = setup(PongConfig::default());
        let mut input = InputState::new();
        game.ball_mut().pos = Vec2::new(480.0, 60.0);
        game.ball_mut().vel = Vec2::new(0.0, 0.0);
        let start = game.paddle(Player::Two).pos;
        tick(&mut game, &mut input, &mut rng, PlayerMode::Single);
        assert_eq!(game.paddle(Player::Two).pos, start);
        assert!(game.paddle(Player::Two).pos.is_finite());
    }

    proptest! {
        #[test]
        fn prop_paddle_hit_never_scores(
            speed in 8.0f32..20.0,
            t in 0.0f32..1.0,
            right_side in any::<bool>(),
        ) {
            let (mut game, mut rng) = setup(PongConfig::default());
            let mut input = InputState::new();
            game.set_speed(speed);
            // Clear of the paddle face now, inside its column after one move
            let gap = 21.7 + t * (speed - 0.2);
            let (x, vx) = if right_side { (960.0 - gap, speed) } else { (gap, -speed) };
            game.ball_mut().pos = Vec2::new(x, 270.0);
            game.ball_mut().vel = Vec2::new(vx, 0.0);
            let outcome = tick(&mut game, &mut input, &mut rng, PlayerMode::Versus);
            prop_assert_eq!(game.hits(), 1);
            prop_assert!(outcome.points.is_empty());
            prop_assert!(outcome.end.is_none());
            prop_assert!(game.ball().vel.x * vx < 0.0);
        }

        #[test]
        fn prop_speed_after_n_hits(n in 0u32..30) {
            let (mut game, _) = setup(PongConfig::default());
            let paddle = game.paddle(Player::Two).aabb();
            let params = game.config().bounce;
            let mut speed = 8.0f32;
            for _ in 0..n {
                game.ball_mut().pos = Vec2::new(940.0, 270.0);
                speed = paddle_bounce(game.ball_mut(), speed, &paddle, -1.0, &params);
                prop_assert!(speed <= params.max_speed);
            }
            let expected = (8.0f32 * 1.12f32.powi(n as i32)).min(20.0);
            prop_assert!((speed - expected).abs() < 1e-3);
        }
    }
}
