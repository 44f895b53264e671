//! Shape definitions for the shared canvas.

mod ellipse;
mod rectangle;
mod stroke;
mod text;

pub use ellipse::Ellipse;
pub use rectangle::Rectangle;
pub use stroke::Stroke;
pub use text::TextBox;

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Unique identifier for layers.
pub type LayerId = Uuid;

/// RGBA8 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a `#rgb`, `#rrggbb` or `#rrggbbaa` hex string.
    /// Returns `None` for anything else.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?.trim();
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 | 8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = if hex.len() == 8 {
                    u8::from_str_radix(&hex[6..8], 16).ok()?
                } else {
                    255
                };
                Some(Self::new(r, g, b, a))
            }
            _ => None,
        }
    }
}

/// Style properties shared by all shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: Color,
    /// Stroke width in canvas units.
    pub stroke_width: f64,
    /// Opacity in `[0.0, 1.0]`.
    pub opacity: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: Color::BLACK,
            stroke_width: 5.0,
            opacity: 1.0,
        }
    }
}

/// Partial geometry update applied by `Scene::update_shape_geometry`.
///
/// Fields that do not apply to the target variant are ignored; size fields
/// are clamped to zero so a patch can never produce negative extents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeometryPatch {
    pub position: Option<Point>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub center: Option<Point>,
    pub radius: Option<f64>,
    pub content: Option<String>,
    pub font_size: Option<f64>,
    pub points: Option<Vec<Point>>,
}

impl GeometryPatch {
    /// Patch for a normalized rectangle extent.
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            position: Some(rect.origin()),
            width: Some(rect.width()),
            height: Some(rect.height()),
            ..Self::default()
        }
    }

    /// Patch that only changes a circle radius.
    pub fn radius(radius: f64) -> Self {
        Self {
            radius: Some(radius),
            ..Self::default()
        }
    }
}

/// A drawable vector primitive placed on a layer.
///
/// Closed set of variants; every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    TextBox(TextBox),
    Stroke(Stroke),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Rectangle(s) => s.id,
            Shape::Ellipse(s) => s.id,
            Shape::TextBox(s) => s.id,
            Shape::Stroke(s) => s.id,
        }
    }

    /// The layer this shape lives on (weak reference, looked up in the scene).
    pub fn layer(&self) -> LayerId {
        match self {
            Shape::Rectangle(s) => s.layer,
            Shape::Ellipse(s) => s.layer,
            Shape::TextBox(s) => s.layer,
            Shape::Stroke(s) => s.layer,
        }
    }

    pub fn set_layer(&mut self, layer: LayerId) {
        match self {
            Shape::Rectangle(s) => s.layer = layer,
            Shape::Ellipse(s) => s.layer = layer,
            Shape::TextBox(s) => s.layer = layer,
            Shape::Stroke(s) => s.layer = layer,
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        match self {
            Shape::Rectangle(s) => &s.style,
            Shape::Ellipse(s) => &s.style,
            Shape::TextBox(s) => &s.style,
            Shape::Stroke(s) => &s.style,
        }
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        match self {
            Shape::Rectangle(s) => &mut s.style,
            Shape::Ellipse(s) => &mut s.style,
            Shape::TextBox(s) => &mut s.style,
            Shape::Stroke(s) => &mut s.style,
        }
    }

    /// Bounding box in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rectangle(s) => s.bounds(),
            Shape::Ellipse(s) => s.bounds(),
            Shape::TextBox(s) => s.bounds(),
            Shape::Stroke(s) => s.bounds(),
        }
    }

    /// Check if a canvas-space point hits this shape.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Shape::Rectangle(s) => s.hit_test(point, tolerance),
            Shape::Ellipse(s) => s.hit_test(point, tolerance),
            Shape::TextBox(s) => s.hit_test(point, tolerance),
            Shape::Stroke(s) => s.hit_test(point, tolerance),
        }
    }

    /// Translate the shape by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Shape::Rectangle(s) => s.position += delta,
            Shape::Ellipse(s) => s.center += delta,
            Shape::TextBox(s) => s.position += delta,
            Shape::Stroke(s) => {
                for p in &mut s.points {
                    *p += delta;
                }
            }
        }
    }

    /// Merge a partial geometry patch, clamping extents to non-negative.
    pub fn apply_patch(&mut self, patch: &GeometryPatch) {
        match self {
            Shape::Rectangle(s) => {
                if let Some(p) = patch.position {
                    s.position = p;
                }
                if let Some(w) = patch.width {
                    s.width = w.max(0.0);
                }
                if let Some(h) = patch.height {
                    s.height = h.max(0.0);
                }
            }
            Shape::Ellipse(s) => {
                if let Some(c) = patch.center {
                    s.center = c;
                }
                if let Some(r) = patch.radius {
                    s.radius = r.max(0.0);
                }
            }
            Shape::TextBox(s) => {
                if let Some(p) = patch.position {
                    s.position = p;
                }
                if let Some(content) = &patch.content {
                    s.content = content.clone();
                }
                if let Some(size) = patch.font_size {
                    s.font_size = size.max(0.0);
                }
            }
            Shape::Stroke(s) => {
                if let Some(points) = &patch.points {
                    s.points = points.clone();
                }
            }
        }
    }
}

/// Distance from a point to a line segment (a→b).
pub(crate) fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    point.distance(proj)
}
