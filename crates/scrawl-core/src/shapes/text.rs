//! Text box shape.

use super::{LayerId, ShapeId, ShapeStyle};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder content for freshly placed text boxes.
pub const PLACEHOLDER_TEXT: &str = "Double click to edit";

/// A text box placed at a point. There is no drag phase: the text tool
/// creates it at the click position with placeholder content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub(crate) id: ShapeId,
    /// Owning layer.
    pub layer: LayerId,
    /// Top-left corner of the text bounding box.
    pub position: Point,
    /// The text content.
    pub content: String,
    /// Font size in canvas units.
    pub font_size: f64,
    pub style: ShapeStyle,
}

impl TextBox {
    pub fn new(layer: LayerId, position: Point, content: impl Into<String>, font_size: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            layer,
            position,
            content: content.into(),
            font_size: font_size.max(0.0),
            style: ShapeStyle::default(),
        }
    }

    /// Create a text box with placeholder content at a click position.
    pub fn placeholder(layer: LayerId, position: Point, font_size: f64) -> Self {
        Self::new(layer, position, PLACEHOLDER_TEXT, font_size)
    }

    /// Estimated bounding box. The core has no text measurement; this uses
    /// a monospace-ish approximation good enough for hit testing and moves.
    pub fn bounds(&self) -> Rect {
        let longest = self
            .content
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as f64;
        let lines = self.content.lines().count().max(1) as f64;
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + longest * self.font_size * 0.6,
            self.position.y + lines * self.font_size * 1.2,
        )
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }
}
