//! One owned round: controller, game rules, input and RNG in a single value
//!
//! Nothing here is global, so any number of rounds can run side by side
//! (tests create dozens). The host pushes key events and calls [`RoundContext::step`]
//! once per fixed tick; renderers read [`RoundContext::snapshot`].

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::body::Body;
use super::dash::DashPhase;
use super::event::{EndCause, RoundEvent};
use super::round::{ClockKind, RoundController, RoundProfile, RoundState, TickReport};
use crate::consts::SIM_DT;
use crate::input::{
    InputBinding, InputState, KeyEvent, KeyLayout, KeyPhase, Resolved, is_restart_key,
};
use crate::settings::{PlayerMode, Settings};
use crate::Player;

/// What a game asks the controller to do after an Active tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    /// Score deltas, applied in order before any round end
    pub points: Vec<(Player, i32)>,
    pub end: Option<(EndCause, Option<Player>)>,
}

/// Host verdict on a submitted answer (quiz and word rounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Correct,
    Incorrect,
    /// Not judged (e.g. a word already used); only feedback is shown
    Rejected,
}

/// Controller side effects of an answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub points: Option<(Player, i32)>,
    pub pass_turn: bool,
    /// Seconds taken off the running clock
    pub penalty_secs: u32,
    pub feedback: bool,
}

/// Mutable view handed to a game for one Active tick
pub struct StepInput<'a> {
    pub input: &'a mut InputState,
    pub mode: PlayerMode,
    pub rng: &'a mut Pcg32,
    pub dt: f32,
}

/// Rules and entities of one game on top of the shared round lifecycle
pub trait Game {
    fn name(&self) -> &'static str;

    fn profile(&self) -> RoundProfile;

    /// Lay out round-start entities
    fn reset(&mut self, mode: PlayerMode, rng: &mut Pcg32);

    /// One Active tick
    fn step(&mut self, step: &mut StepInput<'_>) -> StepOutcome;

    fn entities(&self) -> Vec<EntityView>;

    /// Player to move first in turn-based rounds
    fn opening_turn(&self, _mode: PlayerMode, _rng: &mut Pcg32) -> Option<Player> {
        None
    }

    fn answer(
        &mut self,
        _player: Player,
        _verdict: Verdict,
        _turn: Player,
        _mode: PlayerMode,
    ) -> AnswerOutcome {
        AnswerOutcome::default()
    }
}

impl<G: Game + ?Sized> Game for Box<G> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn profile(&self) -> RoundProfile {
        (**self).profile()
    }

    fn reset(&mut self, mode: PlayerMode, rng: &mut Pcg32) {
        (**self).reset(mode, rng)
    }

    fn step(&mut self, step: &mut StepInput<'_>) -> StepOutcome {
        (**self).step(step)
    }

    fn entities(&self) -> Vec<EntityView> {
        (**self).entities()
    }

    fn opening_turn(&self, mode: PlayerMode, rng: &mut Pcg32) -> Option<Player> {
        (**self).opening_turn(mode, rng)
    }

    fn answer(
        &mut self,
        player: Player,
        verdict: Verdict,
        turn: Player,
        mode: PlayerMode,
    ) -> AnswerOutcome {
        (**self).answer(player, verdict, turn, mode)
    }
}

/// Entity category for renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Avatar,
    Platform,
    Paddle,
    Ball,
    Arena,
}

/// Read-only entity for drawing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    /// Stable within a round
    pub id: u32,
    pub kind: EntityKind,
    pub owner: Option<Player>,
    pub body: Body,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facing: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<DashPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airborne: Option<bool>,
}

impl EntityView {
    pub fn new(id: u32, kind: EntityKind, owner: Option<Player>, body: Body) -> Self {
        Self {
            id,
            kind,
            owner,
            body,
            facing: None,
            dash: None,
            airborne: None,
        }
    }
}

/// Everything a renderer or scoreboard needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub game: &'static str,
    pub state: RoundState,
    pub countdown: Option<u8>,
    pub round: u32,
    pub scores: [u32; 2],
    pub clocks: [Option<u32>; 2],
    /// Player on turn while per-player clocks run
    pub turn: Option<Player>,
    pub winner: Option<Player>,
    pub elapsed: f32,
    pub player_mode: PlayerMode,
    pub key_layout: KeyLayout,
    pub auto_restart: bool,
    pub entities: Vec<EntityView>,
}

/// One round and everything it owns
pub struct RoundContext<G: Game> {
    round: RoundController,
    game: G,
    binding: InputBinding,
    input: InputState,
    rng: Pcg32,
    settings: Settings,
}

impl<G: Game> RoundContext<G> {
    pub fn new(mut game: G, settings: Settings, seed: u64) -> Self {
        let round = RoundController::new(
            game.profile(),
            settings.player_mode,
            settings.auto_restart,
        );
        let mut rng = Pcg32::seed_from_u64(seed);
        // Board visible while Idle
        game.reset(settings.player_mode, &mut rng);
        log::info!(
            "{} ready ({}, {} keys)",
            game.name(),
            settings.player_mode.as_str(),
            settings.key_layout.as_str()
        );
        Self {
            round,
            game,
            binding: InputBinding::new(settings.key_layout),
            input: InputState::new(),
            rng,
            settings,
        }
    }

    pub fn round(&self) -> &RoundController {
        &self.round
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    // --- host signals ---

    /// Raw key from the host. The restart key is handled here; everything
    /// else goes through the active bindings.
    pub fn key_event(&mut self, event: &KeyEvent<'_>) -> Vec<Resolved> {
        if event.phase == KeyPhase::Down && is_restart_key(event.key) {
            self.restart();
            return Vec::new();
        }
        self.binding.poll(event, &mut self.input)
    }

    pub fn restart(&mut self) -> bool {
        self.round.restart()
    }

    /// Takes effect on the next poll; held keys keep their old binding
    pub fn set_key_layout(&mut self, layout: KeyLayout) {
        self.settings.key_layout = layout;
        self.binding.select_layout(layout);
    }

    /// Resets scores and restarts the round
    pub fn set_player_mode(&mut self, mode: PlayerMode) {
        if mode == self.settings.player_mode {
            return;
        }
        self.settings.player_mode = mode;
        self.round.set_player_mode(mode);
        self.round.force_restart();
    }

    /// Applied when the next round is armed
    pub fn set_auto_restart(&mut self, enabled: bool) {
        self.settings.auto_restart = enabled;
        self.round.set_auto_restart(enabled);
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.settings.dark_mode = enabled;
    }

    /// Apply a whole settings value, each field with its own timing
    pub fn apply_settings(&mut self, settings: Settings) {
        self.set_key_layout(settings.key_layout);
        self.set_auto_restart(settings.auto_restart);
        self.set_dark_mode(settings.dark_mode);
        self.set_player_mode(settings.player_mode);
    }

    /// Judge a submitted answer. Ignored outside Active.
    pub fn answer(&mut self, player: Player, verdict: Verdict) -> bool {
        if !self.round.is_active() {
            return false;
        }
        let outcome = self.game.answer(
            player,
            verdict,
            self.round.turn(),
            self.round.player_mode(),
        );
        log::debug!("{:?} answered {:?}: {:?}", player, verdict, outcome);
        if let Some((scorer, delta)) = outcome.points {
            self.round.award(scorer, delta);
        }
        if outcome.feedback {
            self.round.show_feedback();
        }
        if outcome.pass_turn {
            self.round.pass_turn();
        }
        if outcome.penalty_secs > 0 {
            self.round.penalize(outcome.penalty_secs);
        }
        true
    }

    // --- simulation ---

    /// Advance one fixed tick
    pub fn step(&mut self) -> TickReport {
        let report = self.round.tick();
        let mode = self.round.player_mode();

        if report.began {
            self.game.reset(mode, &mut self.rng);
            if let Some(first) = self.game.opening_turn(mode, &mut self.rng) {
                self.round.set_turn(first);
            }
        }

        if self.round.is_active() {
            let outcome = self.game.step(&mut StepInput {
                input: &mut self.input,
                mode,
                rng: &mut self.rng,
                dt: SIM_DT,
            });
            for (player, delta) in outcome.points {
                self.round.award(player, delta);
            }
            if let Some((cause, winner)) = outcome.end {
                self.round.finish(cause, winner);
            }
        }

        self.input.end_tick();
        report
    }

    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        self.round.drain_events()
    }

    pub fn snapshot(&self) -> Snapshot {
        let round = &self.round;
        let turn = match round.clock_kind() {
            ClockKind::PerPlayer { .. } if round.is_active() => Some(round.turn()),
            _ => None,
        };
        Snapshot {
            game: self.game.name(),
            state: round.state(),
            countdown: round.countdown(),
            round: round.round_index(),
            scores: round.scores(),
            clocks: Player::ALL.map(|p| round.clock_remaining(p)),
            turn,
            winner: round.winner(),
            elapsed: round.elapsed_secs(),
            player_mode: round.player_mode(),
            key_layout: self.binding.layout(),
            auto_restart: round.auto_restart(),
            entities: self.game.entities(),
        }
    }
}
