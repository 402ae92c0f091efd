//! Arcade - shared core for a family of small two-player browser games
//!
//! Core modules:
//! - `input`: Raw key → per-player logical action bindings
//! - `clock`: Frame delta clamping and fixed-step accumulation
//! - `sim`: Deterministic simulation (round state machine, physics, collisions, AI)
//! - `games`: Per-game rules and tuning (jump, pong, sumo, timed quiz rounds)
//! - `host`: Renderer / score display boundaries and the per-frame session driver
//! - `settings`: Runtime toggles and the persisted dark-mode preference

pub mod clock;
pub mod games;
pub mod host;
pub mod input;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use clock::{Clock, FixedStep};
pub use games::GameKind;
pub use host::{Renderer, ScoreSink, Session};
pub use input::{Action, InputBinding, InputState, KeyLayout};
pub use settings::{PlayerMode, Preferences, Settings};

use serde::{Deserialize, Serialize};

/// Loop configuration constants
pub mod consts {
    /// Fixed simulation rate. The games are tuned in per-frame units at 60 Hz.
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted from the host (suspended tab, debugger pause)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Frame rate the per-frame tuning constants were authored against
    pub const REFERENCE_FPS: f32 = 60.0;

    /// Default playfield size used when the host does not supply one
    pub const DEFAULT_WIDTH: f32 = 960.0;
    pub const DEFAULT_HEIGHT: f32 = 540.0;
}

/// One of the two local player slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    #[inline]
    pub fn other(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn from_index(index: usize) -> Option<Player> {
        match index {
            0 => Some(Player::One),
            1 => Some(Player::Two),
            _ => None,
        }
    }
}

/// Scale factor converting a timestep into reference frames (1.0 at 60 Hz)
#[inline]
pub fn frame_scale(dt: f32) -> f32 {
    dt * consts::REFERENCE_FPS
}

/// Whole simulation ticks covering `secs` at the given rate (at least one)
#[inline]
pub fn secs_to_ticks(secs: f32, hz: u32) -> u64 {
    ((secs * hz as f32).round() as u64).max(1)
}
