//! Circle shape.

use super::{LayerId, ShapeId, ShapeStyle};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle, defined by center and radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub(crate) id: ShapeId,
    /// Owning layer.
    pub layer: LayerId,
    /// Center point.
    pub center: Point,
    /// Radius, never negative.
    pub radius: f64,
    pub style: ShapeStyle,
}

impl Ellipse {
    /// Create a new circle. A negative radius is clamped to zero.
    pub fn new(layer: LayerId, center: Point, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            layer,
            center,
            radius: radius.max(0.0),
            style: ShapeStyle::default(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.center.distance(point) <= self.radius + tolerance + self.style.stroke_width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_radius_clamped() {
        let circle = Ellipse::new(Uuid::new_v4(), Point::new(0.0, 0.0), -5.0);
        assert!(circle.radius.abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let mut circle = Ellipse::new(Uuid::new_v4(), Point::new(0.0, 0.0), 10.0);
        circle.style.stroke_width = 0.0;
        assert!(circle.hit_test(Point::new(0.0, 0.0), 0.0));
        assert!(circle.hit_test(Point::new(10.0, 0.0), 0.0));
        assert!(!circle.hit_test(Point::new(15.0, 0.0), 0.0));
        assert!(circle.hit_test(Point::new(12.0, 0.0), 3.0));
    }

    #[test]
    fn test_bounds() {
        let circle = Ellipse::new(Uuid::new_v4(), Point::new(50.0, 50.0), 20.0);
        let bounds = circle.bounds();
        assert!((bounds.x0 - 30.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }
}
