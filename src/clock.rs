//! Frame timing
//!
//! [`Clock`] turns host timestamps into clamped frame deltas; [`FixedStep`]
//! splits those deltas into whole simulation ticks.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Wall-clock delta source
#[derive(Debug, Clone)]
pub struct Clock {
    last: Option<f64>,
    max_dt: f32,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT)
    }
}

impl Clock {
    pub fn new(max_dt: f32) -> Self {
        Self { last: None, max_dt }
    }

    /// Seconds since the previous call, clamped to `[0, max_dt]`.
    ///
    /// `now` is in seconds. The first call returns 0. Timestamps that go
    /// backwards or are not finite count as no elapsed time.
    pub fn tick(&mut self, now: f64) -> f32 {
        if !now.is_finite() {
            return 0.0;
        }
        let dt = match self.last {
            Some(last) => (now - last) as f32,
            None => 0.0,
        };
        self.last = Some(now);
        if !dt.is_finite() || dt <= 0.0 {
            return 0.0;
        }
        if dt > self.max_dt {
            log::debug!("Clamping frame delta {:.3}s to {:.3}s", dt, self.max_dt);
        }
        dt.min(self.max_dt)
    }

    /// Forget the previous timestamp (tab became visible again)
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Accumulator for a fixed simulation step
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f32,
    accumulator: f32,
    max_substeps: u32,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(SIM_DT)
    }
}

impl FixedStep {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            accumulator: 0.0,
            max_substeps: MAX_SUBSTEPS,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Add frame time and return how many ticks to run now
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.max(0.0);

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < self.max_substeps {
            self.accumulator -= self.step;
            substeps += 1;
        }
        // Drop the backlog rather than spiralling
        if substeps == self.max_substeps {
            self.accumulator = self.accumulator.min(self.step);
        }
        substeps
    }

    /// Fraction of a step left over (for render interpolation)
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }
}
