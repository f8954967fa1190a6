//! Reactive obstacle avoidance with feeler rays.
//!
//! Given a desired direction, a small fan of short rays probes the obstacle
//! field ahead; each hit pushes the direction away from the obstacle along
//! the hit surface normal, weighted so closer obstacles push harder. The
//! adjustment is purely local and memoryless — it does not guarantee escape
//! from concave traps, which is why the employee controller carries its own
//! stuck detection as a backstop.

use clockout_common::Vec2;
use serde::{Deserialize, Serialize};

/// Result of a raycast against the obstacle field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// Surface normal at the hit point (unit length, facing the ray origin).
    pub normal: Vec2,
}

/// Obstacle queries for the simulation.
///
/// One obstacle classification does double duty here: the same field is
/// probed by the avoidance feeler rays and by line-of-sight checks. Keep
/// that in mind when implementing it — anything that blocks sight also
/// deflects movement.
pub trait ObstacleField {
    /// Casts a ray from `origin` along `direction` (need not be normalized)
    /// up to `max_distance`. Returns the nearest hit, or `None` if the path
    /// is clear.
    fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit>;

    /// Checks whether the straight segment from `from` to `to` is free of
    /// obstacles. Clear if and only if the raycast reports no hit.
    fn line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        let delta = to - from;
        let distance = delta.length();
        if distance <= f32::EPSILON {
            return true;
        }
        self.raycast(from, delta, distance).is_none()
    }
}

/// Configuration for the feeler-ray fan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvoidanceConfig {
    /// Number of feeler rays in the fan.
    pub ray_count: u32,
    /// Half-angle of the fan in degrees; rays are spread symmetrically
    /// across `[-spread_angle, +spread_angle]` around the desired direction.
    pub spread_angle: f32,
    /// Base feeler length in world units, scaled by current speed.
    pub ray_length: f32,
    /// Multiplier on the accumulated push away from obstacles.
    pub strength: f32,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            ray_count: 3,
            spread_angle: 45.0,
            ray_length: 1.5,
            strength: 2.0,
        }
    }
}

/// Adjusts `desired` (any non-zero vector) to steer around obstacles.
///
/// The feeler length scales with `speed / base_speed` so faster movement
/// probes further ahead. Each hit contributes
/// `normal * (1 - distance / length) * strength`; the result is the
/// normalized sum of the desired direction and the accumulated push.
///
/// Degenerate inputs pass through: a zero desired direction returns zero,
/// and a fan with no rays returns the desired direction unchanged.
#[must_use]
pub fn avoid_obstacles<F: ObstacleField + ?Sized>(
    origin: Vec2,
    desired: Vec2,
    speed: f32,
    base_speed: f32,
    config: &AvoidanceConfig,
    field: &F,
) -> Vec2 {
    let desired = desired.normalized();
    if desired == Vec2::ZERO || config.ray_count == 0 {
        return desired;
    }

    let scale = if base_speed > 0.0 {
        speed / base_speed
    } else {
        1.0
    };
    let ray_length = config.ray_length * scale;
    if ray_length <= 0.0 {
        return desired;
    }

    let mut avoidance = Vec2::ZERO;
    for i in 0..config.ray_count {
        // Map ray index across [-spread, +spread]; a single ray probes
        // straight ahead.
        let fraction = if config.ray_count <= 1 {
            0.5
        } else {
            i as f32 / (config.ray_count - 1) as f32
        };
        let angle = (-config.spread_angle + 2.0 * config.spread_angle * fraction).to_radians();
        let ray_dir = desired.rotated(angle);

        if let Some(hit) = field.raycast(origin, ray_dir, ray_length) {
            let weight = 1.0 - (hit.distance / ray_length);
            avoidance += hit.normal * (weight * config.strength);
        }
    }

    (desired + avoidance).normalized()
}

/// Obstacle field made of line-segment walls, for tests and simple maps.
///
/// Each wall is a segment; its normal is reported facing whichever side the
/// ray came from.
#[derive(Debug, Clone, Default)]
pub struct SegmentObstacleField {
    walls: Vec<(Vec2, Vec2)>,
}

impl SegmentObstacleField {
    /// Creates an empty (fully open) field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a wall segment from `a` to `b`.
    pub fn add_wall(&mut self, a: Vec2, b: Vec2) {
        self.walls.push((a, b));
    }

    /// Number of wall segments.
    #[must_use]
    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }
}

impl ObstacleField for SegmentObstacleField {
    fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        let dir = direction.normalized();
        if dir == Vec2::ZERO || max_distance <= 0.0 {
            return None;
        }

        let mut nearest: Option<RayHit> = None;
        for &(a, b) in &self.walls {
            let seg = b - a;
            // Solve origin + t*dir = a + u*seg via the 2D cross product.
            let denom = dir.x * seg.y - dir.y * seg.x;
            if denom.abs() <= f32::EPSILON {
                continue; // parallel
            }
            let diff = a - origin;
            let t = (diff.x * seg.y - diff.y * seg.x) / denom;
            let u = (diff.x * dir.y - diff.y * dir.x) / denom;
            if t < 0.0 || t > max_distance || !(0.0..=1.0).contains(&u) {
                continue;
            }
            if nearest.map_or(true, |hit| t < hit.distance) {
                // Normal perpendicular to the segment, facing the ray origin.
                let mut normal = Vec2::new(-seg.y, seg.x).normalized();
                if normal.dot(dir) > 0.0 {
                    normal = -normal;
                }
                nearest = Some(RayHit {
                    distance: t,
                    normal,
                });
            }
        }
        nearest
    }
}

/// Obstacle field with no obstacles at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenField;

impl ObstacleField for OpenField {
    fn raycast(&self, _origin: Vec2, _direction: Vec2, _max_distance: f32) -> Option<RayHit> {
        None
    }
}
