//! Per-game rules and tuning on top of the shared round core
//!
//! Each game only supplies its constants, entity layout and the rules that
//! turn collisions into points and round ends. Lifecycle, timers and input
//! stay in [`crate::sim`].

pub mod jump;
pub mod pong;
pub mod sumo;
pub mod timed;

use serde::{Deserialize, Serialize};

use crate::sim::Game;

pub use jump::{JumpConfig, JumpGame};
pub use pong::{GoalPolicy, PongConfig, PongGame};
pub use sumo::{SumoConfig, SumoGame};
pub use timed::{TimedGame, TimedKind, TimedRules};

/// Every game in the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Jump,
    Pong,
    Sumo,
    Reflex,
    Math,
    Words,
}

impl GameKind {
    pub const ALL: [GameKind; 6] = [
        GameKind::Jump,
        GameKind::Pong,
        GameKind::Sumo,
        GameKind::Reflex,
        GameKind::Math,
        GameKind::Words,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Jump => "jump",
            GameKind::Pong => "pong",
            GameKind::Sumo => "sumo",
            GameKind::Reflex => "reflex",
            GameKind::Math => "math",
            GameKind::Words => "words",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// Whether the game simulates bodies every tick
    pub fn is_physical(&self) -> bool {
        matches!(self, GameKind::Jump | GameKind::Pong | GameKind::Sumo)
    }

    /// Build the game with default tuning for a `width` × `height` field
    pub fn build(&self, width: f32, height: f32) -> Box<dyn Game> {
        match self {
            GameKind::Jump => Box::new(JumpGame::new(JumpConfig::default(), width, height)),
            GameKind::Pong => Box::new(PongGame::new(PongConfig::default(), width, height)),
            GameKind::Sumo => Box::new(SumoGame::new(SumoConfig::default(), width, height)),
            GameKind::Reflex => Box::new(TimedGame::new(TimedKind::Reflex)),
            GameKind::Math => Box::new(TimedGame::new(TimedKind::Math)),
            GameKind::Words => Box::new(TimedGame::new(TimedKind::Words)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_round_trips() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(GameKind::from_str(" PONG "), Some(GameKind::Pong));
        assert_eq!(GameKind::from_str("tetris"), None);
    }

    #[test]
    fn test_build_names_match() {
        for kind in GameKind::ALL {
            assert_eq!(kind.build(960.0, 540.0).name(), kind.as_str());
        }
    }
}
