//! Arena module
//!
//! The playfield: rectangular bounds, the shared obstacle field, and the
//! player body the driver moves around in it.

mod obstacles;
mod player;

pub use obstacles::ObstacleField;
pub use player::Player;

use glam::Vec2;

use crate::geometry::Rect;

/// Arena bounds plus the obstacles inside them.
///
/// Owned by the simulation driver; agents only ever borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct Arena {
    bounds: Rect,
    obstacles: ObstacleField,
}

impl Arena {
    /// Create an arena of the given size anchored at the origin
    #[must_use]
    pub fn new(width: f32, height: f32, obstacles: ObstacleField) -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, width, height),
            obstacles,
        }
    }

    /// Arena without obstacles
    #[must_use]
    pub fn open(width: f32, height: f32) -> Self {
        Self::new(width, height, ObstacleField::new())
    }

    /// Arena bounds
    #[must_use]
    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    /// Obstacle field
    #[must_use]
    pub fn obstacles(&self) -> &ObstacleField {
        &self.obstacles
    }

    /// Clamp a circle's center so the whole circle stays inside the bounds
    #[must_use]
    pub fn clamp_circle(&self, center: Vec2, radius: f32) -> Vec2 {
        let min = self.bounds.min() + Vec2::splat(radius);
        let max = (self.bounds.max() - Vec2::splat(radius)).max(min);
        center.clamp(min, max)
    }

    /// Check whether a circle lies fully inside the bounds
    #[must_use]
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        let min = self.bounds.min() + Vec2::splat(radius);
        let max = self.bounds.max() - Vec2::splat(radius);
        center.x >= min.x && center.x <= max.x && center.y >= min.y && center.y <= max.y
    }
}
