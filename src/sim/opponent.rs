//! Computer-controlled opponents
//!
//! Policies only produce steering (the same shape of data a human's keys
//! produce); the game applies it through the normal movement path.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Where a ball moving in a straight line crosses the vertical line `plane_x`,
/// folded back into `[0, height]` for every bounce off the top and bottom.
///
/// Returns `None` when the ball has no usable horizontal speed or the result
/// would not be finite; callers skip movement that tick.
pub fn predict_intercept_y(pos: Vec2, vel: Vec2, plane_x: f32, height: f32) -> Option<f32> {
    if vel.x.abs() < 1e-4 || height <= 0.0 {
        return None;
    }
    let time = (plane_x - pos.x) / vel.x;
    let raw = pos.y + vel.y * time;
    if !raw.is_finite() {
        return None;
    }
    // Reflection between two walls is periodic in 2·height
    let period = 2.0 * height;
    let folded = raw.rem_euclid(period);
    Some(if folded > height {
        period - folded
    } else {
        folded
    })
}

/// Pong paddle tracking the predicted intercept
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddleAi {
    /// Paddle step per reference frame
    pub speed: f32,
    /// Dead zone as a fraction of the paddle height
    pub dead_zone: f32,
}

impl Default for PaddleAi {
    fn default() -> Self {
        Self {
            speed: 7.0,
            dead_zone: 1.0 / 3.0,
        }
    }
}

impl PaddleAi {
    /// -1 (up), 0 or 1 (down). Holds still inside the dead zone.
    pub fn steer(&self, paddle_center: f32, paddle_height: f32, target: Option<f32>) -> f32 {
        let Some(target) = target else {
            return 0.0;
        };
        let offset = target - paddle_center;
        if offset.abs() > paddle_height * self.dead_zone {
            offset.signum()
        } else {
            0.0
        }
    }
}

/// Sumo wrestler that walks straight at its opponent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChaseAi {
    /// Dash when the opponent is closer than this
    pub dash_range: f32,
}

impl Default for ChaseAi {
    fn default() -> Self {
        Self { dash_range: 100.0 }
    }
}

impl ChaseAi {
    /// Unit direction toward the opponent's current position
    pub fn seek(&self, from: Vec2, to: Vec2) -> Vec2 {
        (to - from).normalize_or_zero()
    }

    pub fn wants_dash(&self, from: Vec2, to: Vec2, dash_ready: bool) -> bool {
        dash_ready && from.distance(to) < self.dash_range
    }
}
