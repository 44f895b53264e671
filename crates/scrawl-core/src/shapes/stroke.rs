//! Freehand stroke shape (pen and eraser).

use super::{LayerId, ShapeId, ShapeStyle, point_to_segment_dist};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand stroke: the point samples of one pen or eraser gesture.
///
/// Eraser strokes are ordinary strokes drawn in the canvas background
/// color at double width; the scene does not treat them specially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: ShapeId,
    /// Owning layer.
    pub layer: LayerId,
    /// Path points in gesture order.
    pub points: Vec<Point>,
    pub style: ShapeStyle,
}

impl Stroke {
    pub fn new(layer: LayerId, points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            layer,
            points,
            style: ShapeStyle::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> Rect {
        let mut iter = self.points.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        let mut rect = Rect::from_origin_size(*first, (0.0, 0.0));
        for p in iter {
            rect = rect.union_pt(*p);
        }
        rect
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let reach = tolerance + self.style.stroke_width / 2.0;
        match self.points.len() {
            0 => false,
            1 => self.points[0].distance(point) <= reach,
            _ => self
                .points
                .windows(2)
                .any(|w| point_to_segment_dist(point, w[0], w[1]) <= reach),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let stroke = Stroke::new(
            Uuid::new_v4(),
            vec![
                Point::new(10.0, 20.0),
                Point::new(0.0, 5.0),
                Point::new(30.0, 15.0),
            ],
        );
        let bounds = stroke.bounds();
        assert!((bounds.x0 - 0.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 5.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 30.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_on_segment() {
        let mut stroke = Stroke::new(
            Uuid::new_v4(),
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
        );
        stroke.style.stroke_width = 2.0;
        assert!(stroke.hit_test(Point::new(50.0, 0.5), 0.0));
        assert!(!stroke.hit_test(Point::new(50.0, 20.0), 0.0));
    }

    #[test]
    fn test_hit_test_single_point() {
        let mut stroke = Stroke::new(Uuid::new_v4(), vec![Point::new(5.0, 5.0)]);
        stroke.style.stroke_width = 4.0;
        assert!(stroke.hit_test(Point::new(6.0, 5.0), 0.0));
        assert!(!stroke.hit_test(Point::new(20.0, 5.0), 0.0));
    }
}
