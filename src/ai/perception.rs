//! Line-of-sight perception
//!
//! There is no partial occlusion: a single obstacle crossing the sight line
//! blocks vision completely.

use glam::Vec2;

use crate::arena::ObstacleField;

/// Check whether `target` is visible from `origin`.
///
/// False beyond `vision`; otherwise false as soon as any obstacle crosses
/// the straight segment between the two points.
#[must_use]
pub fn can_see(origin: Vec2, vision: f32, target: Vec2, obstacles: &ObstacleField) -> bool {
    if origin.distance(target) > vision {
        return false;
    }
    !obstacles.blocks_segment(origin, target)
}

/// Fraction of `samples` visible from `origin` (0.0 for an empty set)
#[must_use]
pub fn visible_fraction<'a>(
    origin: Vec2,
    vision: f32,
    samples: impl ExactSizeIterator<Item = &'a Vec2>,
    obstacles: &ObstacleField,
) -> f32 {
    let total = samples.len();
    if total == 0 {
        return 0.0;
    }
    let visible = samples
        .filter(|&&sample| can_see(origin, vision, sample, obstacles))
        .count();
    visible as f32 / total as f32
}
