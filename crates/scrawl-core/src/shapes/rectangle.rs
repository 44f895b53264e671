//! Rectangle shape.

use super::{LayerId, ShapeId, ShapeStyle};
use crate::geometry;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned rectangle.
///
/// `width` and `height` are never negative; drag direction is normalized
/// into `position` at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Owning layer.
    pub layer: LayerId,
    /// Top-left corner position.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub style: ShapeStyle,
}

impl Rectangle {
    /// Create a new rectangle. Negative extents are clamped to zero.
    pub fn new(layer: LayerId, position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            layer,
            position,
            width: width.max(0.0),
            height: height.max(0.0),
            style: ShapeStyle::default(),
        }
    }

    /// Create a rectangle spanning two corner points of a drag gesture.
    pub fn from_drag(layer: LayerId, anchor: Point, current: Point) -> Self {
        let rect = geometry::rect_from_drag(anchor, current);
        Self::new(layer, rect.origin(), rect.width(), rect.height())
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    pub fn bounds(&self) -> Rect {
        self.as_rect()
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_rect().inflate(tolerance, tolerance).contains(point)
    }
}
