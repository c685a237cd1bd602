//! Axis-aligned rectangle primitive
//!
//! Used for obstacles and for the arena bounds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in arena space (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub origin: Vec2,
    /// Size (width, height)
    pub size: Vec2,
}

impl Rect {
    /// Create a new rectangle from its top-left corner and size
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Top-left corner
    #[must_use]
    pub fn min(&self) -> Vec2 {
        self.origin
    }

    /// Bottom-right corner
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    /// Center point
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Corners in boundary order: top-left, top-right, bottom-right, bottom-left
    #[must_use]
    pub fn corners(&self) -> [Vec2; 4] {
        let min = self.min();
        let max = self.max();
        [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ]
    }

    /// The four boundary edges as segments, following `corners()` order
    #[must_use]
    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        let c = self.corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    /// Nearest point of the rectangle to `point` (the point itself when inside)
    #[must_use]
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min(), self.max())
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }
}
