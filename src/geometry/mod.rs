//! 2D geometry module
//!
//! Rectangles plus the intersection predicates used by perception and steering.

mod intersect;
mod rect;

pub use intersect::{
    circle_intersects_rect, orientation, segment_intersects_rect, segments_intersect,
};
pub use rect::Rect;
