//! Round core shared by every game
//!
//! Everything in here is deterministic for a given seed and key sequence.
//! Time advances only in fixed ticks, randomness comes from the round's
//! seeded `Pcg32`, and nothing touches the DOM or a renderer.

pub mod body;
pub mod collision;
pub mod context;
pub mod dash;
pub mod event;
pub mod opponent;
pub mod round;
pub mod timer;

pub use body::{Aabb, Body, FrictionParams, GravityParams, Shape};
pub use collision::{BounceParams, CollisionResult};
pub use context::{
    AnswerOutcome, EntityKind, EntityView, Game, RoundContext, Snapshot, StepInput, StepOutcome,
    Verdict,
};
pub use dash::{DashPhase, DashState, DashTimings};
pub use event::{EndCause, RoundEvent};
pub use opponent::{ChaseAi, PaddleAi};
pub use round::{ClockKind, RoundController, RoundProfile, RoundState, TickReport};
pub use timer::{Scheduler, TimerId};
