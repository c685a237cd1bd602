//! Segment and circle intersection tests
//!
//! All functions are pure and total over finite floats. The segment predicate
//! is strict: collinear and touching configurations never count as crossing.

use glam::Vec2;

use super::Rect;

/// Signed (doubled) area of the triangle `a`, `b`, `c`.
///
/// Positive when `c` lies to the left of `a -> b` in a y-up frame.
#[inline]
#[must_use]
pub fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// True iff segment `a-b` properly crosses segment `c-d`.
#[must_use]
pub fn segments_intersect(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    orientation(a, c, d) * orientation(b, c, d) < 0.0
        && orientation(a, b, c) * orientation(a, b, d) < 0.0
}

/// True iff segment `a-b` crosses any boundary edge of `rect`.
///
/// A segment lying entirely inside the rectangle does not cross it.
#[must_use]
pub fn segment_intersects_rect(a: Vec2, b: Vec2, rect: &Rect) -> bool {
    rect.edges()
        .iter()
        .any(|&(c, d)| segments_intersect(a, b, c, d))
}

/// True when a circle overlaps or is contained in `rect` (touching counts).
#[must_use]
pub fn circle_intersects_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let nearest = rect.closest_point(center);
    center.distance_squared(nearest) <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_sign() {
        let a = Vec2::ZERO;
        let b = Vec2::X;

        assert!(orientation(a, b, Vec2::Y) > 0.0);
        assert!(orientation(a, b, -Vec2::Y) < 0.0);
        assert_eq!(orientation(a, b, Vec2::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn test_segments_cross() {
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        ));
    }

    #[test]
    fn test_segments_touching_endpoint_is_not_crossing() {
        // b lies exactly on c-d
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        ));
    }

    #[test]
    fn test_segments_collinear_overlap_is_not_crossing() {
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(15.0, 0.0),
        ));
    }

    #[test]
    fn test_segment_through_rect() {
        let rect = Rect::new(10.0, 10.0, 10.0, 10.0);

        assert!(segment_intersects_rect(
            Vec2::new(0.0, 15.0),
            Vec2::new(30.0, 15.0),
            &rect
        ));
        assert!(!segment_intersects_rect(
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.0),
            &rect
        ));
    }

    #[test]
    fn test_segment_inside_rect_does_not_cross() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);

        assert!(!segment_intersects_rect(
            Vec2::new(10.0, 10.0),
            Vec2::new(90.0, 90.0),
            &rect
        ));
    }

    #[test]
    fn test_circle_rect_overlap() {
        let rect = Rect::new(100.0, 100.0, 50.0, 50.0);

        // Contained
        assert!(circle_intersects_rect(Vec2::new(125.0, 125.0), 5.0, &rect));
        // Overlapping an edge
        assert!(circle_intersects_rect(Vec2::new(95.0, 125.0), 10.0, &rect));
        // Touching exactly counts
        assert!(circle_intersects_rect(Vec2::new(90.0, 125.0), 10.0, &rect));
        // Clear
        assert!(!circle_intersects_rect(Vec2::new(80.0, 125.0), 10.0, &rect));
        // Near a corner but outside the radius
        assert!(!circle_intersects_rect(Vec2::new(90.0, 90.0), 10.0, &rect));
    }
}
