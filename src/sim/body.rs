//! Kinematic bodies and the two integration styles the games use
//!
//! Rectangles are positioned by their top-left corner and circles by their
//! centre, in screen space (+y down). Tuning constants are per reference
//! frame; every integrator scales them with [`frame_scale`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::frame_scale;

/// Collision shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect { w: f32, h: f32 },
    Circle { r: f32 },
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Position, velocity and shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub shape: Shape,
}

impl Body {
    pub fn rect(pos: Vec2, w: f32, h: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            shape: Shape::Rect { w, h },
        }
    }

    pub fn circle(center: Vec2, r: f32) -> Self {
        Self {
            pos: center,
            vel: Vec2::ZERO,
            shape: Shape::Circle { r },
        }
    }

    pub fn size(&self) -> Vec2 {
        match self.shape {
            Shape::Rect { w, h } => Vec2::new(w, h),
            Shape::Circle { r } => Vec2::splat(2.0 * r),
        }
    }

    pub fn radius(&self) -> f32 {
        match self.shape {
            Shape::Rect { w, h } => 0.5 * w.max(h),
            Shape::Circle { r } => r,
        }
    }

    pub fn center(&self) -> Vec2 {
        match self.shape {
            Shape::Rect { w, h } => self.pos + 0.5 * Vec2::new(w, h),
            Shape::Circle { .. } => self.pos,
        }
    }

    pub fn aabb(&self) -> Aabb {
        match self.shape {
            Shape::Rect { w, h } => Aabb {
                min: self.pos,
                max: self.pos + Vec2::new(w, h),
            },
            Shape::Circle { r } => Aabb {
                min: self.pos - Vec2::splat(r),
                max: self.pos + Vec2::splat(r),
            },
        }
    }

    /// Bottom edge (rect feet)
    pub fn bottom(&self) -> f32 {
        self.aabb().max.y
    }

    /// Move by velocity for one step
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.pos += self.vel * frame_scale(dt);
    }
}

/// Platformer tuning (per reference frame)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityParams {
    pub gravity: f32,
    /// Vertical velocity set on jump (negative = up)
    pub jump_impulse: f32,
    /// Horizontal displacement per frame while a direction is held
    pub move_step: f32,
}

/// Vertical motion has inertia: `vy += g; y += vy`
pub fn integrate_gravity(body: &mut Body, params: &GravityParams, dt: f32) {
    let scale = frame_scale(dt);
    body.vel.y += params.gravity * scale;
    body.pos.y += body.vel.y * scale;
}

/// Horizontal motion has none: a direct position step gated by the bounds.
///
/// `dir` is -1, 0 or 1. The gate is checked before moving, as the games do,
/// so a body may end up to one step past an edge but never walks further.
pub fn step_horizontal(body: &mut Body, dir: f32, step: f32, min_x: f32, max_x: f32, dt: f32) {
    let delta = step * frame_scale(dt);
    let width = body.size().x;
    if dir < 0.0 && body.pos.x > min_x {
        body.pos.x -= delta;
    }
    if dir > 0.0 && body.pos.x + width < max_x {
        body.pos.x += delta;
    }
}

/// Top-down drag tuning (per reference frame)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrictionParams {
    /// Multiplier from input push to velocity change per second
    pub accel: f32,
    /// Velocity kept per frame (exponential decay toward rest)
    pub damping: f32,
}

/// Accelerate from `push`, then damp. Does not move the body.
pub fn apply_friction(body: &mut Body, push: Vec2, params: &FrictionParams, dt: f32) {
    body.vel += push * dt * params.accel;
    body.vel *= params.damping.powf(frame_scale(dt));
}

/// Scale `vel` down to `max_speed` if it is faster
#[inline]
pub fn clamp_speed(vel: Vec2, max_speed: f32) -> Vec2 {
    vel.clamp_length_max(max_speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use proptest::prelude::*;

    const PLATFORMER: GravityParams = GravityParams {
        gravity: 0.5,
        jump_impulse: -15.0,
        move_step: 5.0,
    };

    const DRAG: FrictionParams = FrictionParams {
        accel: 10.0,
        damping: 0.9,
    };

    #[test]
    fn test_gravity_accumulates() {
        let mut body = Body::rect(Vec2::new(0.0, 0.0), 40.0, 40.0);
        integrate_gravity(&mut body, &PLATFORMER, SIM_DT);
        assert!((body.vel.y - 0.5).abs() < 1e-5);
        assert!((body.pos.y - 0.5).abs() < 1e-5);
        integrate_gravity(&mut body, &PLATFORMER, SIM_DT);
        assert!((body.vel.y - 1.0).abs() < 1e-5);
        assert!((body.pos.y - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_horizontal_has_no_inertia() {
        let mut body = Body::rect(Vec2::new(100.0, 0.0), 40.0, 40.0);
        step_horizontal(&mut body, 1.0, 5.0, 0.0, 800.0, SIM_DT);
        assert!((body.pos.x - 105.0).abs() < 1e-4);
        assert_eq!(body.vel.x, 0.0);
        step_horizontal(&mut body, 0.0, 5.0, 0.0, 800.0, SIM_DT);
        assert!((body.pos.x - 105.0).abs() < 1e-4);
    }

    #[test]
    fn test_horizontal_gated_by_bounds() {
        let mut body = Body::rect(Vec2::new(0.0, 0.0), 40.0, 40.0);
        step_horizontal(&mut body, -1.0, 5.0, 0.0, 800.0, SIM_DT);
        assert_eq!(body.pos.x, 0.0);
        let mut body = Body::rect(Vec2::new(760.0, 0.0), 40.0, 40.0);
        step_horizontal(&mut body, 1.0, 5.0, 0.0, 800.0, SIM_DT);
        assert_eq!(body.pos.x, 760.0);
    }

    #[test]
    fn test_friction_decays_toward_rest() {
        let mut body = Body::circle(Vec2::ZERO, 30.0);
        body.vel = Vec2::new(10.0, 0.0);
        for _ in 0..60 {
            apply_friction(&mut body, Vec2::ZERO, &DRAG, SIM_DT);
        }
        // 0.9^60
        assert!((body.vel.x - 10.0 * 0.9f32.powi(60)).abs() < 1e-3);
    }

    #[test]
    fn test_clamp_speed() {
        let v = clamp_speed(Vec2::new(30.0, 40.0), 20.0);
        assert!((v.length() - 20.0).abs() < 1e-4);
        assert_eq!(clamp_speed(Vec2::new(3.0, 4.0), 20.0), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_aabb_overlap_is_strict() {
        let a = Body::rect(Vec2::ZERO, 10.0, 10.0).aabb();
        let b = Body::rect(Vec2::new(10.0, 0.0), 10.0, 10.0).aabb();
        let c = Body::rect(Vec2::new(9.0, 9.0), 10.0, 10.0).aabb();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }

    proptest! {
        #[test]
        fn prop_stationary_body_without_input_stays_put(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
            dt in 0.0f32..0.1,
        ) {
            let mut body = Body::circle(Vec2::new(x, y), 30.0);
            apply_friction(&mut body, Vec2::ZERO, &DRAG, dt);
            body.advance(dt);
            prop_assert_eq!(body.pos, Vec2::new(x, y));

            let mut paddle = Body::rect(Vec2::new(x, y), 10.0, 90.0);
            step_horizontal(&mut paddle, 0.0, 7.0, -2000.0, 2000.0, dt);
            paddle.advance(dt);
            prop_assert_eq!(paddle.pos, Vec2::new(x, y));
        }

        #[test]
        fn prop_clamped_speed_never_exceeds_max(
            vx in -500.0f32..500.0,
            vy in -500.0f32..500.0,
            max in 1.0f32..100.0,
        ) {
            let v = clamp_speed(Vec2::new(vx, vy), max);
            prop_assert!(v.length() <= max * (1.0 + 1e-5));
        }
    }
}
