//! Collision detection and response
//!
//! Four cases cover every game: one-way platform landing (box on box),
//! ball against walls and paddles (circle against box), wrestler bumps
//! (circle against circle) and ring containment (circle inside circle).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Aabb, Body};

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point (if hit)
    pub point: Vec2,
    /// Contact normal, pointing from the first body toward the second
    pub normal: Vec2,
    /// Overlap before correction
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Slack for feet that were snapped onto a platform top last tick
const REST_EPSILON: f32 = 1e-3;

/// One-way platform landing.
///
/// A rect body moving down (vy ≥ 0) whose feet were at or above the platform's
/// bottom edge before the move and are at or below its top edge after it,
/// while overlapping horizontally, is snapped on top with vy = 0. The swept
/// test means a fast fall cannot tunnel through a thin platform.
///
/// `carry` is how far the platform itself moved down this tick. Feet that
/// were within that distance above the new top were resting on the platform
/// and ride along with it, even if gravity alone did not reach it.
pub fn land_on_platform(body: &mut Body, prev_bottom: f32, platform: &Aabb, carry: f32) -> bool {
    if body.vel.y < 0.0 {
        return false;
    }
    let size = body.size();
    let feet = body.pos.y + size.y;
    let resting = prev_bottom + carry.max(0.0) + REST_EPSILON >= platform.min.y;
    let spans_top = prev_bottom <= platform.max.y && (feet >= platform.min.y || resting);
    let overlaps_x = body.pos.x + size.x > platform.min.x && body.pos.x < platform.max.x;
    if !(spans_top && overlaps_x) {
        return false;
    }
    body.pos.y = platform.min.y - size.y;
    body.vel.y = 0.0;
    true
}

/// Bounce a circle off horizontal walls at `top` and `bottom`.
///
/// Sets the sign of vy rather than negating it, so a ball that is still
/// overlapping a wall on the next tick cannot get stuck flipping.
pub fn reflect_off_walls(ball: &mut Body, top: f32, bottom: f32) -> bool {
    let r = ball.radius();
    if ball.pos.y + r > bottom {
        ball.vel.y = -ball.vel.y.abs();
        true
    } else if ball.pos.y - r < top {
        ball.vel.y = ball.vel.y.abs();
        true
    } else {
        false
    }
}

/// Circle against box using the circle's bounding box
pub fn circle_hits_box(center: Vec2, radius: f32, rect: &Aabb) -> bool {
    center.x - radius < rect.max.x
        && center.x + radius > rect.min.x
        && center.y - radius < rect.max.y
        && center.y + radius > rect.min.y
}

/// Paddle bounce tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BounceParams {
    /// Exit angle at the paddle tip (radians)
    pub max_angle: f32,
    /// Speed multiplier per hit
    pub growth: f32,
    pub max_speed: f32,
}

/// Send the ball back across the midline.
///
/// The exit angle is the contact offset (-1 at the paddle top, 1 at the
/// bottom) times `max_angle`; the speed grows by `growth` up to `max_speed`.
/// `direction` is +1 to head right, -1 to head left. Returns the new speed.
pub fn paddle_bounce(
    ball: &mut Body,
    speed: f32,
    paddle: &Aabb,
    direction: f32,
    params: &BounceParams,
) -> f32 {
    let half_height = 0.5 * (paddle.max.y - paddle.min.y);
    let paddle_center = paddle.min.y + half_height;
    let offset = if half_height > f32::EPSILON {
        ((ball.pos.y - paddle_center) / half_height).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let angle = params.max_angle * offset;
    let speed = (speed * params.growth).min(params.max_speed);

    ball.vel = Vec2::new(direction * speed * angle.cos(), speed * angle.sin());
    speed
}

/// Separate two overlapping circles and exchange momentum.
///
/// Each body is pushed out by half the overlap along the contact normal, then
/// velocities are blended by radius (the elastic formula with mass ∝ radius).
/// Equal radii swap velocities.
pub fn resolve_circle_pair(a: &mut Body, b: &mut Body) -> CollisionResult {
    let ra = a.radius();
    let rb = b.radius();
    let delta = b.pos - a.pos;
    let distance = delta.length();
    let min_dist = ra + rb;
    if distance >= min_dist {
        return CollisionResult::miss();
    }

    // Coincident centres: pick a fixed axis instead of dividing by zero
    let normal = if distance > f32::EPSILON {
        delta / distance
    } else {
        Vec2::X
    };
    let overlap = 0.5 * (min_dist - distance);
    a.pos -= normal * overlap;
    b.pos += normal * overlap;

    let relative = a.vel - b.vel;
    let sum = ra + rb;
    a.vel = (a.vel * (ra - rb) + 2.0 * rb * b.vel) / sum;
    b.vel = relative + a.vel;

    CollisionResult {
        hit: true,
        point: a.pos + normal * ra,
        normal,
        penetration: min_dist - distance,
    }
}

/// A circle is out once its far edge passes the arena edge (strictly)
#[inline]
pub fn outside_ring(center: Vec2, radius: f32, arena_center: Vec2, arena_radius: f32) -> bool {
    center.distance(arena_center) + radius > arena_radius
}
