//! Dash burst: Ready → Charging → Dashing → Cooldown → Ready

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashPhase {
    Ready,
    /// Wind-up; the body is held still
    Charging,
    /// Moving at the boosted speed along the facing angle
    Dashing,
    /// Dash unavailable
    Cooldown,
}

/// Dash timings in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashTimings {
    pub charge: f32,
    pub active: f32,
    pub cooldown: f32,
    /// Dash speed = base speed × this
    pub speed_multiplier: f32,
}

impl Default for DashTimings {
    fn default() -> Self {
        Self {
            charge: 0.1,
            active: 0.2,
            cooldown: 0.5,
            speed_multiplier: 3.0,
        }
    }
}

/// Current phase and the time left in it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashState {
    phase: DashPhase,
    remaining: f32,
}

impl Default for DashState {
    fn default() -> Self {
        Self {
            phase: DashPhase::Ready,
            remaining: 0.0,
        }
    }
}

impl DashState {
    pub fn phase(&self) -> DashPhase {
        self.phase
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn is_ready(&self) -> bool {
        self.phase == DashPhase::Ready
    }

    /// Charging and dashing override steering input
    pub fn locks_movement(&self) -> bool {
        matches!(self.phase, DashPhase::Charging | DashPhase::Dashing)
    }

    /// Start charging. Only possible from `Ready`.
    pub fn trigger(&mut self, timings: &DashTimings) -> bool {
        if self.phase != DashPhase::Ready {
            return false;
        }
        self.phase = DashPhase::Charging;
        self.remaining = timings.charge;
        true
    }

    /// Run the phase timer. At most one transition per call, so no phase is
    /// ever skipped. Returns the phase entered, if any.
    pub fn update(&mut self, dt: f32, timings: &DashTimings) -> Option<DashPhase> {
        if self.phase == DashPhase::Ready {
            return None;
        }
        self.remaining -= dt;
        if self.remaining > 0.0 {
            return None;
        }
        let (next, duration) = match self.phase {
            DashPhase::Charging => (DashPhase::Dashing, timings.active),
            DashPhase::Dashing => (DashPhase::Cooldown, timings.cooldown),
            DashPhase::Cooldown | DashPhase::Ready => (DashPhase::Ready, 0.0),
        };
        self.phase = next;
        self.remaining = duration;
        Some(next)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle_in_order() {
        let timings = DashTimings::default();
        let mut dash = DashState::default();
        assert!(dash.trigger(&timings));
        assert!(!dash.trigger(&timings));

        let dt = 1.0 / 60.0;
        let mut seen = vec![dash.phase()];
        for _ in 0..120 {
            if let Some(phase) = dash.update(dt, &timings) {
                seen.push(phase);
            }
        }
        assert_eq!(
            seen,
            vec![
                DashPhase::Charging,
                DashPhase::Dashing,
                DashPhase::Cooldown,
                DashPhase::Ready
            ]
        );
    }

    #[test]
    fn test_huge_step_advances_one_phase_at_a_time() {
        let timings = DashTimings::default();
        let mut dash = DashState::default();
        dash.trigger(&timings);
        assert_eq!(dash.update(10.0, &timings), Some(DashPhase::Dashing));
        assert_eq!(dash.update(10.0, &timings), Some(DashPhase::Cooldown));
        assert!(!dash.trigger(&timings));
        assert_eq!(dash.update(10.0, &timings), Some(DashPhase::Ready));
        assert!(dash.is_ready());
    }

    #[test]
    fn test_charge_and_dash_lock_movement() {
        let timings = DashTimings::default();
        let mut dash = DashState::default();
        assert!(!dash.locks_movement());
        dash.trigger(&timings);
        assert!(dash.locks_movement());
        dash.update(1.0, &timings);
        assert!(dash.locks_movement());
        dash.update(1.0, &timings);
        assert_eq!(dash.phase(), DashPhase::Cooldown);
        assert!(!dash.locks_movement());
    }
}
