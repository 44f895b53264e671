//! Drag-to-extent computations.
//!
//! Pure functions that turn a pointer gesture (anchor point plus current
//! point) into shape extents. Negative drag deltas are normalized into the
//! origin so width, height and radius are never negative.

use kurbo::{Point, Rect};

/// Compute a normalized rectangle from a drag gesture.
///
/// The origin is the component-wise minimum of the two points, so dragging
/// up-left produces the same rectangle as dragging down-right.
pub fn rect_from_drag(anchor: Point, current: Point) -> Rect {
    Rect::new(
        anchor.x.min(current.x),
        anchor.y.min(current.y),
        anchor.x.max(current.x),
        anchor.y.max(current.y),
    )
}

/// Compute a circle radius from a drag gesture: the Euclidean distance
/// between the center and the current pointer.
pub fn radius_from_drag(center: Point, current: Point) -> f64 {
    center.distance(current)
}
