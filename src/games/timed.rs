//! Clock-driven quiz rounds: reflex arrows, mental math and word building
//!
//! These games have no bodies. The host renders prompts, judges answers and
//! reports a [`Verdict`]; the rules here turn verdicts into points, turn
//! changes and clock penalties. Round clocks live in the controller.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::settings::PlayerMode;
use crate::sim::{
    AnswerOutcome, ClockKind, EntityView, Game, RoundProfile, StepInput, StepOutcome, Verdict,
};
use crate::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimedKind {
    Reflex,
    Math,
    Words,
}

/// Scoring and clock rules for one quiz game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedRules {
    pub countdown_secs: u8,
    pub clock_single: ClockKind,
    pub clock_versus: ClockKind,
    pub correct_points: i32,
    pub incorrect_points: i32,
    /// Seconds off the running clock for a wrong answer
    pub penalty_secs: u32,
    /// Answers belong to the player on turn, and a correct one passes the turn
    pub turn_based: bool,
}

impl TimedRules {
    pub fn for_kind(kind: TimedKind) -> Self {
        match kind {
            TimedKind::Reflex | TimedKind::Math => Self {
                countdown_secs: 3,
                clock_single: ClockKind::Shared { seconds: 60 },
                clock_versus: ClockKind::Shared { seconds: 60 },
                correct_points: 1,
                incorrect_points: -1,
                penalty_secs: 0,
                turn_based: false,
            },
            TimedKind::Words => Self {
                countdown_secs: 15,
                clock_single: ClockKind::Shared { seconds: 60 },
                clock_versus: ClockKind::PerPlayer { seconds: 45 },
                correct_points: 1,
                incorrect_points: 0,
                penalty_secs: 6,
                turn_based: true,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimedGame {
    kind: TimedKind,
    rules: TimedRules,
}

impl TimedGame {
    pub fn new(kind: TimedKind) -> Self {
        Self::with_rules(kind, TimedRules::for_kind(kind))
    }

    pub fn with_rules(kind: TimedKind, rules: TimedRules) -> Self {
        Self { kind, rules }
    }

    pub fn kind(&self) -> TimedKind {
        self.kind
    }

    pub fn rules(&self) -> &TimedRules {
        &self.rules
    }
}

impl Game for TimedGame {
    fn name(&self) -> &'static str {
        match self.kind {
            TimedKind::Reflex => "reflex",
            TimedKind::Math => "math",
            TimedKind::Words => "words",
        }
    }

    fn profile(&self) -> RoundProfile {
        RoundProfile {
            countdown_secs: self.rules.countdown_secs,
            reset_scores_each_round: true,
            clock_single: self.rules.clock_single,
            clock_versus: self.rules.clock_versus,
            ..Default::default()
        }
    }

    fn reset(&mut self, _mode: PlayerMode, _rng: &mut Pcg32) {}

    fn step(&mut self, _step: &mut StepInput<'_>) -> StepOutcome {
        StepOutcome::default()
    }

    fn entities(&self) -> Vec<EntityView> {
        Vec::new()
    }

    /// Random first player for turn-based versus rounds
    fn opening_turn(&self, mode: PlayerMode, rng: &mut Pcg32) -> Option<Player> {
        if !(self.rules.turn_based && mode.is_versus()) {
            return None;
        }
        Some(if rng.random_bool(0.5) {
            Player::One
        } else {
            Player::Two
        })
    }

    fn answer(
        &mut self,
        player: Player,
        verdict: Verdict,
        turn: Player,
        mode: PlayerMode,
    ) -> AnswerOutcome {
        let rules = &self.rules;
        let owner = match (rules.turn_based, mode) {
            (true, PlayerMode::Versus) => turn,
            (true, PlayerMode::Single) => Player::One,
            (false, _) => player,
        };
        let mut outcome = AnswerOutcome {
            feedback: true,
            ..Default::default()
        };
        match verdict {
            Verdict::Correct => {
                outcome.points = Some((owner, rules.correct_points));
                outcome.pass_turn = rules.turn_based && mode.is_versus();
            }
            Verdict::Incorrect => {
                if rules.incorrect_points != 0 {
                    outcome.points = Some((owner, rules.incorrect_points));
                }
                outcome.penalty_secs = rules.penalty_secs;
            }
            Verdict::Rejected => {}
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_reflex_scores_submitter_both_ways() {
        let mut game = TimedGame::new(TimedKind::Reflex);
        let out = game.answer(Player::Two, Verdict::Correct, Player::One, PlayerMode::Versus);
        assert_eq!(out.points, Some((Player::Two, 1)));
        assert!(!out.pass_turn);
        let out = game.answer(Player::Two, Verdict::Incorrect, Player::One, PlayerMode::Versus);
        assert_eq!(out.points, Some((Player::Two, -1)));
        assert_eq!(out.penalty_secs, 0);
        assert!(out.feedback);
    }

    #[test]
    fn test_words_valid_word_passes_turn() {
        let mut game = TimedGame::new(TimedKind::Words);
        let out = game.answer(Player::One, Verdict::Correct, Player::Two, PlayerMode::Versus);
        assert_eq!(out.points, Some((Player::Two, 1)));
        assert!(out.pass_turn);
    }

    #[test]
    fn test_words_invalid_word_costs_six_seconds() {
        let mut game = TimedGame::new(TimedKind::Words);
        let out = game.answer(Player::One, Verdict::Incorrect, Player::One, PlayerMode::Versus);
        assert_eq!(out.points, None);
        assert_eq!(out.penalty_secs, 6);
        assert!(!out.pass_turn);

        let out = game.answer(Player::One, Verdict::Rejected, Player::One, PlayerMode::Single);
        assert_eq!(out, AnswerOutcome { feedback: true, ..Default::default() });
    }

    #[test]
    fn test_words_profile() {
        let game = TimedGame::new(TimedKind::Words);
        let profile = game.profile();
        assert_eq!(profile.countdown_secs, 15);
        assert_eq!(profile.clock_versus, ClockKind::PerPlayer { seconds: 45 });
        assert_eq!(profile.clock_single, ClockKind::Shared { seconds: 60 });
    }

    #[test]
    fn test_opening_turn_only_for_turn_based_versus() {
        let mut rng = Pcg32::seed_from_u64(1);
        let words = TimedGame::new(TimedKind::Words);
        assert!(words.opening_turn(PlayerMode::Versus, &mut rng).is_some());
        assert!(words.opening_turn(PlayerMode::Single, &mut rng).is_none());
        let math = TimedGame::new(TimedKind::Math);
        assert!(math.opening_turn(PlayerMode::Versus, &mut rng).is_none());
    }
}
