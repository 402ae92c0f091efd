//! Notifications emitted by the round controller for score/status displays

use serde::{Deserialize, Serialize};

use crate::Player;

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    /// A player dropped below the arena floor
    FellOff,
    /// The ball crossed a goal line
    Scored,
    /// A wrestler left the ring
    RingOut,
    /// The shared round clock ran out
    TimeUp,
    /// The clock of the player on turn ran out
    WordTimeout,
}

impl EndCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndCause::FellOff => "fell off",
            EndCause::Scored => "scored",
            EndCause::RingOut => "ring out",
            EndCause::TimeUp => "time up",
            EndCause::WordTimeout => "word timeout",
        }
    }
}

/// Round lifecycle and scoreboard notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    CountdownStarted { from: u8 },
    CountdownTick { remaining: u8 },
    RoundStarted { round: u32 },
    ScoreChanged { player: Player, score: u32 },
    ScoresReset,
    /// Whole seconds left on a round clock (`player` is `None` for a shared clock)
    ClockTick { player: Option<Player>, remaining: u32 },
    TurnChanged { player: Player },
    FeedbackShown,
    FeedbackCleared,
    RoundEnded { cause: EndCause, winner: Option<Player> },
}
