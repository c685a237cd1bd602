//! Static obstacle field
//!
//! The field is built once by the driver and borrowed read-only by every agent
//! each tick. Agents never add or remove obstacles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, circle_intersects_rect, segment_intersects_rect};

/// An immutable set of solid axis-aligned rectangles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObstacleField {
    rects: Vec<Rect>,
}

impl ObstacleField {
    /// Create an empty field
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a field from a list of rectangles
    #[must_use]
    pub fn from_rects(rects: impl Into<Vec<Rect>>) -> Self {
        Self {
            rects: rects.into(),
        }
    }

    /// Obstacles of the stock 640x480 arena
    #[must_use]
    pub fn default_layout() -> Self {
        Self::from_rects(vec![
            Rect::new(220.0, 150.0, 80.0, 180.0),
            Rect::new(400.0, 60.0, 40.0, 120.0),
            Rect::new(120.0, 320.0, 200.0, 30.0),
            Rect::new(40.0, 40.0, 60.0, 60.0),
            Rect::new(500.0, 200.0, 50.0, 140.0),
            Rect::new(300.0, 10.0, 80.0, 40.0),
        ])
    }

    /// Iterate over all obstacles
    pub fn iter(&self) -> impl Iterator<Item = &Rect> {
        self.rects.iter()
    }

    /// Number of obstacles
    #[must_use]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Check if the field has no obstacles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Check whether a circle overlaps any obstacle
    #[must_use]
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        self.rects
            .iter()
            .any(|rect| circle_intersects_rect(center, radius, rect))
    }

    /// Check whether the straight segment `a-b` crosses any obstacle
    #[must_use]
    pub fn blocks_segment(&self, a: Vec2, b: Vec2) -> bool {
        self.rects
            .iter()
            .any(|rect| segment_intersects_rect(a, b, rect))
    }
}

impl FromIterator<Rect> for ObstacleField {
    fn from_iter<I: IntoIterator<Item = Rect>>(iter: I) -> Self {
        Self {
            rects: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_field_never_blocks() {
        let field = ObstacleField::new();

        assert!(field.is_empty());
        assert!(!field.overlaps_circle(Vec2::new(10.0, 10.0), 50.0));
        assert!(!field.blocks_segment(Vec2::ZERO, Vec2::new(600.0, 400.0)));
    }

    #[test]
    fn test_default_layout() {
        let field = ObstacleField::default_layout();

        assert_eq!(field.len(), 6);
        // Inside the tall central pillar
        assert!(field.overlaps_circle(Vec2::new(260.0, 240.0), 1.0));
        // Horizontal line through the pillar
        assert!(field.blocks_segment(Vec2::new(180.0, 240.0), Vec2::new(340.0, 240.0)));
    }

    #[test]
    fn test_field_from_iterator() {
        let field: ObstacleField = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(100.0, 100.0, 10.0, 10.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(field.len(), 2);
        assert!(field.overlaps_circle(Vec2::new(12.0, 5.0), 3.0));
        assert!(!field.overlaps_circle(Vec2::new(50.0, 50.0), 3.0));
    }
}
