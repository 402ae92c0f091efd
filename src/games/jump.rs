//! Platform jumper
//!
//! Platforms scroll down and wrap to the top; players jump between them.
//! Every tick a player comes to rest on a platform scores a point, and the
//! round ends when a player drops below the floor.

use std::cmp::Ordering;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::input::Action;
use crate::settings::PlayerMode;
use crate::sim::body::{Body, GravityParams, integrate_gravity, step_horizontal};
use crate::sim::collision::land_on_platform;
use crate::sim::{EndCause, EntityKind, EntityView, Game, RoundProfile, StepInput, StepOutcome};
use crate::{Player, frame_scale};

/// Jumper tuning (per reference frame)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JumpConfig {
    pub platform_count: usize,
    pub platform_width: f32,
    pub platform_height: f32,
    /// Downward scroll per frame
    pub scroll_speed: f32,
    pub player_size: f32,
    pub physics: GravityParams,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            platform_count: 16,
            platform_width: 70.0,
            platform_height: 15.0,
            scroll_speed: 1.0,
            player_size: 40.0,
            physics: GravityParams {
                gravity: 0.5,
                jump_impulse: -15.0,
                move_step: 5.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Jumper {
    body: Body,
    airborne: bool,
}

#[derive(Debug, Clone)]
pub struct JumpGame {
    config: JumpConfig,
    width: f32,
    height: f32,
    platforms: Vec<Body>,
    players: [Jumper; 2],
    /// Landings this round, mirroring the round scores
    points: [u32; 2],
    mode: PlayerMode,
}

impl JumpGame {
    pub fn new(config: JumpConfig, width: f32, height: f32) -> Self {
        let size = config.player_size;
        let jumper = Jumper {
            body: Body::rect(Vec2::ZERO, size, size),
            airborne: false,
        };
        Self {
            config,
            width,
            height,
            platforms: Vec::with_capacity(config.platform_count),
            players: [jumper; 2],
            points: [0; 2],
            mode: PlayerMode::Single,
        }
    }

    pub fn config(&self) -> &JumpConfig {
        &self.config
    }

    pub fn platforms(&self) -> &[Body] {
        &self.platforms
    }

    pub fn player(&self, player: Player) -> &Body {
        &self.players[player.index()].body
    }

    pub fn is_airborne(&self, player: Player) -> bool {
        self.players[player.index()].airborne
    }

    /// Players simulated in the current mode
    fn active_players(&self) -> &'static [Player] {
        if self.mode.is_versus() {
            &Player::ALL
        } else {
            &[Player::One]
        }
    }

    fn random_x(&self, rng: &mut Pcg32) -> f32 {
        let span = (self.width - self.config.platform_width).max(0.0);
        if span > 0.0 {
            rng.random_range(0.0..span)
        } else {
            0.0
        }
    }

    fn scroll_delta(&self, dt: f32) -> f32 {
        self.config.scroll_speed * frame_scale(dt)
    }

    fn scroll_platforms(&mut self, rng: &mut Pcg32, dt: f32) {
        let delta = self.scroll_delta(dt);
        for i in 0..self.platforms.len() {
            self.platforms[i].pos.y += delta;
            if self.platforms[i].pos.y > self.height {
                let x = self.random_x(rng);
                let platform = &mut self.platforms[i];
                platform.pos = Vec2::new(x, -self.config.platform_height);
            }
        }
    }

    /// Move one jumper; returns whether it landed this tick
    fn update_jumper(&mut self, player: Player, step: &StepInput<'_>) -> bool {
        let physics = self.config.physics;
        let width = self.width;
        let carry = self.scroll_delta(step.dt);
        let jumper = &mut self.players[player.index()];

        let prev_bottom = jumper.body.bottom();
        integrate_gravity(&mut jumper.body, &physics, step.dt);

        let dir = step.input.axis(player).x;
        step_horizontal(&mut jumper.body, dir, physics.move_step, 0.0, width, step.dt);

        if step.input.is_down(player, Action::Up) && !jumper.airborne {
            jumper.body.vel.y = physics.jump_impulse;
            jumper.airborne = true;
        }

        for platform in &self.platforms {
            if land_on_platform(&mut jumper.body, prev_bottom, &platform.aabb(), carry) {
                jumper.airborne = false;
                return true;
            }
        }
        // Walked off a ledge or the platform scrolled away
        if jumper.body.vel.y != 0.0 {
            jumper.airborne = true;
        }
        false
    }

    /// Versus winner after a fall: the higher score, none on a tie
    fn leader(&self) -> Option<Player> {
        let [one, two] = self.points;
        match one.cmp(&two) {
            Ordering::Greater => Some(Player::One),
            Ordering::Less => Some(Player::Two),
            Ordering::Equal => None,
        }
    }
}

impl Game for JumpGame {
    fn name(&self) -> &'static str {
        "jump"
    }

    fn profile(&self) -> RoundProfile {
        RoundProfile {
            reset_scores_each_round: true,
            ..Default::default()
        }
    }

    fn reset(&mut self, mode: PlayerMode, rng: &mut Pcg32) {
        self.mode = mode;
        self.points = [0; 2];
        let cfg = self.config;
        self.platforms.clear();

        let center = Body::rect(
            Vec2::new((self.width - cfg.platform_width) / 2.0, self.height / 2.0),
            cfg.platform_width,
            cfg.platform_height,
        );
        self.platforms.push(center);

        let spacing = self.height / cfg.platform_count.max(1) as f32;
        for i in 1..cfg.platform_count {
            let mut y = i as f32 * spacing;
            // Keep clear of the centre platform
            if (y - center.pos.y).abs() < cfg.platform_height * 2.0 {
                y += cfg.platform_height * 2.0;
            }
            let x = self.random_x(rng);
            self.platforms
                .push(Body::rect(Vec2::new(x, y), cfg.platform_width, cfg.platform_height));
        }

        // Players stand at a quarter and three quarters of the centre platform
        for (player, fraction) in Player::ALL.into_iter().zip([0.25, 0.75]) {
            let jumper = &mut self.players[player.index()];
            jumper.body.pos = Vec2::new(
                center.pos.x + cfg.platform_width * fraction - cfg.player_size / 2.0,
                center.pos.y - cfg.player_size,
            );
            jumper.body.vel = Vec2::ZERO;
            jumper.airborne = false;
        }
    }

    fn step(&mut self, step: &mut StepInput<'_>) -> StepOutcome {
        self.scroll_platforms(step.rng, step.dt);

        let mut outcome = StepOutcome::default();
        for &player in self.active_players() {
            if self.update_jumper(player, step) {
                self.points[player.index()] += 1;
                outcome.points.push((player, 1));
            }
            if self.players[player.index()].body.pos.y > self.height {
                log::debug!("{:?} fell off, landings {:?}", player, self.points);
                let winner = if self.mode.is_versus() {
                    self.leader()
                } else {
                    None
                };
                outcome.end = Some((EndCause::FellOff, winner));
                break;
            }
        }
        outcome
    }

    fn entities(&self) -> Vec<EntityView> {
        let mut views: Vec<EntityView> = self
            .platforms
            .iter()
            .enumerate()
            .map(|(i, p)| EntityView::new(i as u32 + 2, EntityKind::Platform, None, *p))
            .collect();
        for &player in self.active_players() {
            let jumper = &self.players[player.index()];
            let mut view = EntityView::new(
                player.index() as u32,
                EntityKind::Avatar,
                Some(player),
                jumper.body,
            );
            view.airborne = Some(jumper.airborne);
            views.push(view);
        }
        views
    }
}
