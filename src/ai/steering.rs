//! Steering and collision-aware movement
//!
//! Steering behaviors turn a goal into a desired per-tick delta; `step` then
//! applies that delta against the obstacle field one axis at a time, which
//! lets the agent slide along walls instead of stopping dead.

use glam::Vec2;
use rand::Rng;

use super::patrol::PatrolRoute;
use super::tuning::BehaviorTuning;
use crate::arena::ObstacleField;
use crate::geometry::circle_intersects_rect;

/// The moving circle steering operates on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Center position
    pub position: Vec2,
    /// Collision radius
    pub radius: f32,
    /// Base speed in units per tick
    pub speed: f32,
}

impl Body {
    /// Create a new body
    #[must_use]
    pub fn new(position: Vec2, radius: f32, speed: f32) -> Self {
        Self {
            position,
            radius,
            speed,
        }
    }

    /// Check whether the body overlaps any obstacle
    #[must_use]
    pub fn is_blocked(&self, obstacles: &ObstacleField) -> bool {
        obstacles.overlaps_circle(self.position, self.radius)
    }
}

/// Output from a steering behavior
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Desired displacement for this tick
    pub linear: Vec2,
}

impl SteeringOutput {
    /// Zero steering
    pub const ZERO: Self = Self { linear: Vec2::ZERO };

    /// Check if this output requests no movement
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.linear == Vec2::ZERO
    }
}

/// Trait for steering behaviors
pub trait SteeringBehavior {
    /// Calculate the desired delta for an agent at `position`
    fn calculate(&self, position: Vec2) -> SteeringOutput;
}

/// Seek behavior - move straight towards a target
#[derive(Debug, Clone)]
pub struct Seek {
    /// Target position
    pub target: Vec2,
    /// Distance covered per tick
    pub speed: f32,
}

impl Seek {
    /// Create a new seek behavior
    #[must_use]
    pub fn new(target: Vec2, speed: f32) -> Self {
        Self { target, speed }
    }
}

impl SteeringBehavior for Seek {
    fn calculate(&self, position: Vec2) -> SteeringOutput {
        let direction = (self.target - position).normalize_or_zero();
        SteeringOutput {
            linear: direction * self.speed,
        }
    }
}

/// Flee behavior - move straight away from a threat
#[derive(Debug, Clone)]
pub struct Flee {
    /// Position to flee from
    pub threat: Vec2,
    /// Distance covered per tick
    pub speed: f32,
}

impl Flee {
    /// Create a new flee behavior
    #[must_use]
    pub fn new(threat: Vec2, speed: f32) -> Self {
        Self { threat, speed }
    }
}

impl SteeringBehavior for Flee {
    /// Zero when standing exactly on the threat; callers pick a direction then
    fn calculate(&self, position: Vec2) -> SteeringOutput {
        let direction = (position - self.threat).normalize_or_zero();
        SteeringOutput {
            linear: direction * self.speed,
        }
    }
}

/// Uniformly random unit vector (never zero)
pub(crate) fn random_direction<R: Rng>(rng: &mut R) -> Vec2 {
    let v = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
    v.try_normalize().unwrap_or(Vec2::X)
}

/// Apply `delta` to the body, axis by axis, against the obstacle field.
///
/// A blocked axis still moves by `blocked_axis_factor` of its component. If
/// the body ends up overlapping an obstacle, a sideways step perpendicular to
/// `delta` is tried on X first, then on Y.
pub fn step(body: &mut Body, delta: Vec2, obstacles: &ObstacleField, tuning: &BehaviorTuning) {
    let radius = body.radius;

    let nx = body.position.x + delta.x;
    if obstacles.overlaps_circle(Vec2::new(nx, body.position.y), radius) {
        body.position.x += delta.x * tuning.blocked_axis_factor;
    } else {
        body.position.x = nx;
    }

    let ny = body.position.y + delta.y;
    if obstacles.overlaps_circle(Vec2::new(body.position.x, ny), radius) {
        body.position.y += delta.y * tuning.blocked_axis_factor;
    } else {
        body.position.y = ny;
    }

    if !body.is_blocked(obstacles) {
        return;
    }

    let Some(perp) = delta.perp().try_normalize() else {
        return;
    };
    let perp = perp * body.speed * tuning.unstick_speed_factor;
    let alt_x = body.position.x + perp.x;
    let alt_y = body.position.y + perp.y;
    if !obstacles.overlaps_circle(Vec2::new(alt_x, body.position.y), radius) {
        log::trace!("Unstick: sidestep on X to {alt_x:.2}");
        body.position.x = alt_x;
    } else if !obstacles.overlaps_circle(Vec2::new(body.position.x, alt_y), radius) {
        log::trace!("Unstick: sidestep on Y to {alt_y:.2}");
        body.position.y = alt_y;
    }
}

/// Step towards `target` at `speed`.
///
/// Returns false only when the body already sits exactly on the target.
pub fn move_towards(
    body: &mut Body,
    target: Vec2,
    speed: f32,
    obstacles: &ObstacleField,
    tuning: &BehaviorTuning,
) -> bool {
    if (target - body.position).length_squared() == 0.0 {
        return false;
    }
    let output = Seek::new(target, speed).calculate(body.position);
    step(body, output.linear, obstacles, tuning);
    true
}

/// Push the body out of every obstacle it overlaps.
///
/// Each overlapping obstacle gets at most `stuck_nudge_attempts` nudges of
/// `stuck_nudge_step` along the line from its center to the body (random when
/// exactly centered). Gives up silently after the cap. Returns whether the
/// body is clear of all obstacles afterwards.
pub fn resolve_stuck<R: Rng>(
    body: &mut Body,
    obstacles: &ObstacleField,
    tuning: &BehaviorTuning,
    rng: &mut R,
) -> bool {
    for rect in obstacles.iter() {
        if !circle_intersects_rect(body.position, body.radius, rect) {
            continue;
        }

        let direction = (body.position - rect.center())
            .try_normalize()
            .unwrap_or_else(|| random_direction(rng));

        for _ in 0..tuning.stuck_nudge_attempts {
            body.position += direction * tuning.stuck_nudge_step;
            if !circle_intersects_rect(body.position, body.radius, rect) {
                break;
            }
        }
    }

    let clear = !body.is_blocked(obstacles);
    if !clear {
        log::trace!("Stuck resolution gave up at {:?}", body.position);
    }
    clear
}

/// Pick the waypoint to resume patrolling from.
///
/// The nearest waypoint wins unless an obstacle blocks the straight line to
/// it; then the search walks outward by index offset, forward before
/// backward, and takes the first reachable one. Falls back to the nearest.
#[must_use]
pub fn resolve_patrol_start(position: Vec2, route: &PatrolRoute, obstacles: &ObstacleField) -> usize {
    let nearest = route.nearest_index(position);
    let blocked = |index: usize| obstacles.blocks_segment(position, route.get(index));

    if !blocked(nearest) {
        return nearest;
    }

    let n = route.len();
    for offset in 1..n {
        let forward = (nearest + offset) % n;
        if !blocked(forward) {
            return forward;
        }
        let backward = (nearest + n - offset) % n;
        if !blocked(backward) {
            return backward;
        }
    }

    nearest
}
