//! Round lifecycle state machine
//!
//! ```text
//! Idle ──restart──▶ Countdown(n) ──n reaches 0──▶ Active ──terminal event──▶ RoundOver
//!  ▲                                                                         │
//!  └──────────── restart (auto-restart off) ◀────────────────────────────────┤
//!                Countdown ◀──── immediately (auto-restart on) ◀─────────────┘
//! ```
//!
//! Countdown seconds and round clocks are cancellable [`Scheduler`] timers
//! owned here; arming a round always cancels the previous handles first.

use serde::{Deserialize, Serialize};

use super::event::{EndCause, RoundEvent};
use super::timer::{Scheduler, TimerId};
use crate::consts::SIM_HZ;
use crate::settings::PlayerMode;
use crate::{Player, secs_to_ticks};

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// Waiting for a restart signal; board visible but frozen
    Idle,
    /// Whole seconds left before play starts
    Countdown(u8),
    /// Simulation and scoring run
    Active,
    /// Frozen on the outcome
    RoundOver(EndCause),
}

/// Optional clock that can end a round on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockKind {
    None,
    /// One clock for the whole round; ends with `TimeUp`
    Shared { seconds: u32 },
    /// Chess clock per player, only the player on turn runs; ends with `WordTimeout`
    PerPlayer { seconds: u32 },
}

/// Per-game lifecycle rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundProfile {
    /// Countdown length in seconds (at least 1)
    pub countdown_secs: u8,
    /// Honour a restart signal during Countdown/Active (abort and restart)
    pub restart_mid_round: bool,
    /// Zero scores whenever a new round is armed
    pub reset_scores_each_round: bool,
    pub clock_single: ClockKind,
    pub clock_versus: ClockKind,
    /// Seconds a feedback message stays up
    pub feedback_secs: f32,
}

impl Default for RoundProfile {
    fn default() -> Self {
        Self {
            countdown_secs: 3,
            restart_mid_round: false,
            reset_scores_each_round: false,
            clock_single: ClockKind::None,
            clock_versus: ClockKind::None,
            feedback_secs: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundTimer {
    CountdownSecond,
    ClockSecond,
    Feedback,
}

/// Result of one controller tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// The countdown finished this tick; entities must be reset
    pub began: bool,
}

/// Owns round state, scores and every round timer
#[derive(Debug, Clone)]
pub struct RoundController {
    profile: RoundProfile,
    state: RoundState,
    tick_hz: u32,
    scores: [u32; 2],
    winner: Option<Player>,
    round_index: u32,
    /// Ticks spent Active in the current round
    active_ticks: u64,
    clock: ClockKind,
    clocks: [u32; 2],
    turn: Player,
    auto_restart: bool,
    player_mode: PlayerMode,
    pending_auto_restart: Option<bool>,
    pending_mode: Option<PlayerMode>,
    scheduler: Scheduler<RoundTimer>,
    countdown_timer: Option<TimerId>,
    clock_timer: Option<TimerId>,
    feedback_timer: Option<TimerId>,
    events: Vec<RoundEvent>,
}

impl RoundController {
    pub fn new(profile: RoundProfile, player_mode: PlayerMode, auto_restart: bool) -> Self {
        Self::with_tick_rate(profile, player_mode, auto_restart, SIM_HZ)
    }

    /// Controller ticking at `tick_hz` (1 Hz makes every tick one second)
    pub fn with_tick_rate(
        profile: RoundProfile,
        player_mode: PlayerMode,
        auto_restart: bool,
        tick_hz: u32,
    ) -> Self {
        Self {
            profile,
            state: RoundState::Idle,
            tick_hz: tick_hz.max(1),
            scores: [0; 2],
            winner: None,
            round_index: 0,
            active_ticks: 0,
            clock: ClockKind::None,
            clocks: [0; 2],
            turn: Player::One,
            auto_restart,
            player_mode,
            pending_auto_restart: None,
            pending_mode: None,
            scheduler: Scheduler::new(),
            countdown_timer: None,
            clock_timer: None,
            feedback_timer: None,
            events: Vec::new(),
        }
    }

    // --- queries ---

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn profile(&self) -> &RoundProfile {
        &self.profile
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == RoundState::Active
    }

    pub fn countdown(&self) -> Option<u8> {
        match self.state {
            RoundState::Countdown(n) => Some(n),
            _ => None,
        }
    }

    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    pub fn score(&self, player: Player) -> u32 {
        self.scores[player.index()]
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Rounds started since creation
    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.active_ticks as f32 / self.tick_hz as f32
    }

    pub fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    pub fn clock_kind(&self) -> ClockKind {
        self.clock
    }

    /// Seconds left on `player`'s clock (the shared clock lives in slot one)
    pub fn clock_remaining(&self, player: Player) -> Option<u32> {
        match self.clock {
            ClockKind::None => None,
            ClockKind::Shared { .. } => Some(self.clocks[0]),
            ClockKind::PerPlayer { .. } => Some(self.clocks[player.index()]),
        }
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn auto_restart(&self) -> bool {
        self.auto_restart
    }

    pub fn player_mode(&self) -> PlayerMode {
        self.player_mode
    }

    /// Live timer count (diagnostics / tests)
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    // --- configuration (applied when the next round is armed) ---

    pub fn set_auto_restart(&mut self, enabled: bool) {
        self.pending_auto_restart = Some(enabled);
    }

    pub fn set_player_mode(&mut self, mode: PlayerMode) {
        self.pending_mode = Some(mode);
    }

    fn apply_pending(&mut self) {
        if let Some(enabled) = self.pending_auto_restart.take() {
            if enabled != self.auto_restart {
                log::info!("Auto-restart: {}", enabled);
            }
            self.auto_restart = enabled;
        }
        if let Some(mode) = self.pending_mode.take() {
            if mode != self.player_mode {
                log::info!("Player mode: {}", mode.as_str());
                self.player_mode = mode;
                self.reset_scores();
            }
        }
    }

    fn reset_scores(&mut self) {
        self.scores = [0; 2];
        self.events.push(RoundEvent::ScoresReset);
    }

    // --- transitions ---

    /// Explicit restart signal from the host.
    ///
    /// Honoured from `Idle` and `RoundOver`. During `Countdown`/`Active` it is
    /// ignored unless the profile allows aborting mid-round.
    pub fn restart(&mut self) -> bool {
        match self.state {
            RoundState::Idle | RoundState::RoundOver(_) => {
                self.arm();
                true
            }
            RoundState::Countdown(_) | RoundState::Active => {
                if self.profile.restart_mid_round {
                    log::info!("Round aborted by restart");
                    self.arm();
                    true
                } else {
                    log::debug!("Restart ignored while {:?}", self.state);
                    false
                }
            }
        }
    }

    /// Restart regardless of state (game-mode change)
    pub fn force_restart(&mut self) {
        self.arm();
    }

    /// Cancel everything and go back to `Idle`
    pub fn stop(&mut self) {
        self.cancel_round_timers();
        self.apply_pending();
        self.state = RoundState::Idle;
    }

    fn cancel_round_timers(&mut self) {
        for handle in [self.countdown_timer.take(), self.clock_timer.take()]
            .into_iter()
            .flatten()
        {
            self.scheduler.cancel(handle);
        }
    }

    /// Enter `Countdown(n)` with fresh timers
    fn arm(&mut self) {
        self.cancel_round_timers();
        self.apply_pending();
        if self.profile.reset_scores_each_round {
            self.reset_scores();
        }

        let from = self.profile.countdown_secs.max(1);
        self.winner = None;
        self.state = RoundState::Countdown(from);
        self.countdown_timer = Some(
            self.scheduler
                .every(self.tick_hz as u64, RoundTimer::CountdownSecond),
        );
        self.events.push(RoundEvent::CountdownStarted { from });
        log::info!("Countdown from {}", from);
    }

    fn begin(&mut self) {
        if let Some(handle) = self.countdown_timer.take() {
            self.scheduler.cancel(handle);
        }
        self.state = RoundState::Active;
        self.round_index += 1;
        self.active_ticks = 0;
        self.turn = Player::One;

        self.clock = if self.player_mode.is_versus() {
            self.profile.clock_versus
        } else {
            self.profile.clock_single
        };
        let seconds = match self.clock {
            ClockKind::None => 0,
            ClockKind::Shared { seconds } | ClockKind::PerPlayer { seconds } => seconds,
        };
        self.clocks = [seconds; 2];
        if self.clock != ClockKind::None {
            self.clock_timer = Some(
                self.scheduler
                    .every(self.tick_hz as u64, RoundTimer::ClockSecond),
            );
        }

        self.events.push(RoundEvent::RoundStarted {
            round: self.round_index,
        });
        log::info!("Round {} started", self.round_index);
    }

    /// Advance timers by one simulation tick
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        for (id, timer) in self.scheduler.advance() {
            match timer {
                RoundTimer::CountdownSecond => {
                    // Stale handle from an aborted countdown
                    if self.countdown_timer != Some(id) {
                        continue;
                    }
                    if let RoundState::Countdown(n) = self.state {
                        let remaining = n.saturating_sub(1);
                        if remaining == 0 {
                            self.begin();
                            report.began = true;
                        } else {
                            self.state = RoundState::Countdown(remaining);
                            self.events.push(RoundEvent::CountdownTick { remaining });
                        }
                    }
                }
                RoundTimer::ClockSecond => {
                    if self.clock_timer == Some(id) && self.is_active() {
                        self.run_clock(1);
                    }
                }
                RoundTimer::Feedback => {
                    if self.feedback_timer == Some(id) {
                        self.feedback_timer = None;
                        self.events.push(RoundEvent::FeedbackCleared);
                    }
                }
            }
        }

        if self.is_active() {
            self.active_ticks += 1;
        }
        report
    }

    /// Take `seconds` off the running clock, ending the round at zero
    fn run_clock(&mut self, seconds: u32) {
        let (slot, player, cause, winner) = match self.clock {
            ClockKind::None => return,
            ClockKind::Shared { .. } => (0, None, EndCause::TimeUp, None),
            ClockKind::PerPlayer { .. } => (
                self.turn.index(),
                Some(self.turn),
                EndCause::WordTimeout,
                Some(self.turn.other()),
            ),
        };
        let remaining = self.clocks[slot].saturating_sub(seconds);
        self.clocks[slot] = remaining;
        self.events.push(RoundEvent::ClockTick { player, remaining });
        if remaining == 0 {
            self.finish(cause, winner);
        }
    }

    /// Change a score by `delta`. Only while Active; scores never go below zero.
    pub fn award(&mut self, player: Player, delta: i32) -> bool {
        if !self.is_active() {
            return false;
        }
        let slot = &mut self.scores[player.index()];
        let updated = if delta >= 0 {
            slot.saturating_add(delta as u32)
        } else {
            slot.saturating_sub(delta.unsigned_abs())
        };
        if updated == *slot {
            return false;
        }
        *slot = updated;
        self.events.push(RoundEvent::ScoreChanged {
            player,
            score: updated,
        });
        true
    }

    /// End the active round with exactly one cause
    pub fn finish(&mut self, cause: EndCause, winner: Option<Player>) -> bool {
        if !self.is_active() {
            return false;
        }
        if let Some(handle) = self.clock_timer.take() {
            self.scheduler.cancel(handle);
        }
        self.state = RoundState::RoundOver(cause);
        self.winner = winner;
        self.events.push(RoundEvent::RoundEnded { cause, winner });
        log::info!(
            "Round {} over: {} (winner: {:?})",
            self.round_index,
            cause.as_str(),
            winner
        );

        if self.auto_restart {
            self.arm();
        }
        true
    }

    /// Hand the turn to the other player (per-player clocks only)
    pub fn pass_turn(&mut self) -> bool {
        if !self.is_active() || !matches!(self.clock, ClockKind::PerPlayer { .. }) {
            return false;
        }
        self.set_turn(self.turn.other())
    }

    pub fn set_turn(&mut self, player: Player) -> bool {
        if !self.is_active() {
            return false;
        }
        self.turn = player;
        self.events.push(RoundEvent::TurnChanged { player });
        true
    }

    /// Time penalty on the running clock
    pub fn penalize(&mut self, seconds: u32) -> bool {
        if !self.is_active() || self.clock == ClockKind::None {
            return false;
        }
        self.run_clock(seconds);
        true
    }

    /// Show a feedback message; a newer message replaces the pending fade
    pub fn show_feedback(&mut self) {
        if let Some(handle) = self.feedback_timer.take() {
            self.scheduler.cancel(handle);
        }
        let delay = secs_to_ticks(self.profile.feedback_secs, self.tick_hz);
        self.feedback_timer = Some(self.scheduler.after(delay, RoundTimer::Feedback));
        self.events.push(RoundEvent::FeedbackShown);
    }
}
