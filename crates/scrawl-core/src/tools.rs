//! Tool state machine.
//!
//! Interprets pointer-event sequences against the active tool and drives
//! scene mutations. Intermediate drag frames mutate the scene locally for
//! live feedback; only the terminal `Up` of a gesture yields a
//! [`GestureEffect`] for the sync broadcaster, so one gesture costs one
//! outbound event no matter how many pointer samples it contained.

use crate::geometry;
use crate::input::PointerEvent;
use crate::scene::Scene;
use crate::shapes::{
    Color, Ellipse, GeometryPatch, Rectangle, Shape, ShapeId, ShapeStyle, Stroke, TextBox,
};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Hit-test slack for the select tool.
const HIT_TOLERANCE: f64 = 4.0;
/// Grab radius around a bounds corner for resize.
const HANDLE_TOLERANCE: f64 = 8.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    Select,
    #[default]
    Pen,
    Eraser,
    Rectangle,
    Circle,
    Text,
}

/// Current draw style, passed in explicitly rather than looked up from
/// ambient state. The host's property panel mutates this directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawSettings {
    pub stroke_color: Color,
    pub stroke_width: f64,
    /// Opacity in `[0.0, 1.0]`.
    pub opacity: f64,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            stroke_color: Color::BLACK,
            stroke_width: 5.0,
            opacity: 1.0,
        }
    }
}

impl DrawSettings {
    fn style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke_color: self.stroke_color,
            stroke_width: self.stroke_width,
            opacity: self.opacity.clamp(0.0, 1.0),
        }
    }

    /// Eraser strokes paint in the canvas background color at double width.
    fn eraser_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke_color: Color::WHITE,
            stroke_width: self.stroke_width * 2.0,
            opacity: 1.0,
        }
    }

    /// Text boxes scale with the configured stroke width.
    fn font_size(&self) -> f64 {
        self.stroke_width * 3.0
    }
}

/// A resize handle on a shape's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Handle {
    fn corner(self, bounds: Rect) -> Point {
        match self {
            Handle::TopLeft => Point::new(bounds.x0, bounds.y0),
            Handle::TopRight => Point::new(bounds.x1, bounds.y0),
            Handle::BottomLeft => Point::new(bounds.x0, bounds.y1),
            Handle::BottomRight => Point::new(bounds.x1, bounds.y1),
        }
    }

    /// The corner that stays fixed while this handle is dragged.
    fn opposite_corner(self, bounds: Rect) -> Point {
        match self {
            Handle::TopLeft => Handle::BottomRight.corner(bounds),
            Handle::TopRight => Handle::BottomLeft.corner(bounds),
            Handle::BottomLeft => Handle::TopRight.corner(bounds),
            Handle::BottomRight => Handle::TopLeft.corner(bounds),
        }
    }

    const ALL: [Handle; 4] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
    ];

    fn grabbed_at(bounds: Rect, point: Point) -> Option<Handle> {
        Handle::ALL
            .into_iter()
            .find(|h| h.corner(bounds).distance(point) <= HANDLE_TOLERANCE)
    }
}

/// How an `Editing` gesture mutates the grabbed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Translate,
    Resize(Handle),
}

/// State of the tool state machine.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    /// Waiting for a gesture.
    #[default]
    Idle,
    /// A rectangle/circle is being dragged out; the shape is already in the
    /// scene (provisional, local-only until `Up`).
    Placing { anchor: Point, shape: ShapeId },
    /// An existing shape is being moved or resized. `original` holds the
    /// pre-gesture snapshot so a cancel can restore it.
    Editing {
        shape: ShapeId,
        mode: EditMode,
        last: Point,
        original: Box<Shape>,
    },
    /// A pen/eraser stroke is being captured.
    FreeDrawing { points: Vec<Point> },
}

/// What a completed gesture did, for the sync broadcaster. At most one per
/// gesture, produced only on the terminal `Up` (or immediately for the
/// text tool, which has no drag phase).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEffect {
    Added(ShapeId),
    Modified(ShapeId),
}

/// The tool state machine. Owns the active tool, the in-flight gesture
/// state, the draw settings and the canvas selection.
#[derive(Debug, Clone, Default)]
pub struct ToolController {
    tool: ToolKind,
    state: ToolState,
    pub settings: DrawSettings,
    selection: Option<ShapeId>,
}

impl ToolController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, ToolState::Idle)
    }

    pub fn selection(&self) -> Option<ShapeId> {
        self.selection
    }

    /// Switch tools. Discards any in-flight gesture (the provisional shape
    /// is removed from the scene, nothing is emitted) and clears selection.
    pub fn set_tool(&mut self, scene: &mut Scene, tool: ToolKind) {
        self.cancel(scene);
        self.selection = None;
        self.tool = tool;
    }

    /// Cancel the in-flight gesture, e.g. on escape. The provisional shape
    /// of a placement is discarded; an editing gesture puts the shape back
    /// where the gesture found it. Either way the scene ends up as if the
    /// gesture never happened, and nothing is emitted.
    pub fn cancel(&mut self, scene: &mut Scene) {
        match std::mem::take(&mut self.state) {
            ToolState::Placing { shape, .. } => {
                if let Err(e) = scene.remove_shape(shape) {
                    log::debug!("provisional shape already gone: {e}");
                }
            }
            ToolState::Editing { original, .. } => {
                // Intermediate edit frames were applied locally; roll the
                // shape back to its pre-gesture snapshot.
                scene.upsert_shape(*original);
            }
            ToolState::Idle | ToolState::FreeDrawing { .. } => {}
        }
    }

    /// Feed one pointer event through the state machine.
    ///
    /// Events with non-finite coordinates are discarded here; an in-flight
    /// gesture stays valid and simply skips the frame.
    pub fn handle_pointer(
        &mut self,
        scene: &mut Scene,
        event: PointerEvent,
    ) -> Option<GestureEffect> {
        if !event.is_finite() {
            log::debug!("discarding pointer event with non-finite coordinates");
            return None;
        }
        match event {
            PointerEvent::Down(p) => self.pointer_down(scene, p),
            PointerEvent::Move(p) => {
                self.pointer_move(scene, p);
                None
            }
            PointerEvent::Up(p) => self.pointer_up(scene, p),
        }
    }

    fn pointer_down(&mut self, scene: &mut Scene, p: Point) -> Option<GestureEffect> {
        match self.tool {
            ToolKind::Select => {
                let hit = scene.shapes_at_point(p, HIT_TOLERANCE).into_iter().next();
                match hit {
                    Some(id) => {
                        self.selection = Some(id);
                        let Some(shape) = scene.shape(id) else {
                            return None;
                        };
                        if scene.is_layer_locked(shape.layer()) {
                            // Selection is allowed on locked layers, mutation is not.
                            log::debug!("shape {id} is on a locked layer, select only");
                            return None;
                        }
                        let mode = match shape {
                            Shape::Rectangle(_) | Shape::Ellipse(_) => {
                                Handle::grabbed_at(shape.bounds(), p)
                                    .map_or(EditMode::Translate, EditMode::Resize)
                            }
                            Shape::TextBox(_) | Shape::Stroke(_) => EditMode::Translate,
                        };
                        self.state = ToolState::Editing {
                            shape: id,
                            mode,
                            last: p,
                            original: Box::new(shape.clone()),
                        };
                    }
                    None => {
                        self.selection = None;
                    }
                }
                None
            }
            ToolKind::Pen | ToolKind::Eraser => {
                self.state = ToolState::FreeDrawing { points: vec![p] };
                None
            }
            ToolKind::Rectangle => {
                let mut rect = Rectangle::new(scene.active_layer(), p, 0.0, 0.0);
                rect.style = self.settings.style();
                match scene.create_shape(Shape::Rectangle(rect)) {
                    Ok(id) => {
                        self.state = ToolState::Placing { anchor: p, shape: id };
                    }
                    Err(e) => log::debug!("draw gesture refused: {e}"),
                }
                None
            }
            ToolKind::Circle => {
                let mut circle = Ellipse::new(scene.active_layer(), p, 0.0);
                circle.style = self.settings.style();
                match scene.create_shape(Shape::Ellipse(circle)) {
                    Ok(id) => {
                        self.state = ToolState::Placing { anchor: p, shape: id };
                    }
                    Err(e) => log::debug!("draw gesture refused: {e}"),
                }
                None
            }
            ToolKind::Text => {
                // No drag phase: the text box is committed immediately.
                let mut text =
                    TextBox::placeholder(scene.active_layer(), p, self.settings.font_size());
                text.style = self.settings.style();
                match scene.create_shape(Shape::TextBox(text)) {
                    Ok(id) => Some(GestureEffect::Added(id)),
                    Err(e) => {
                        log::debug!("text placement refused: {e}");
                        None
                    }
                }
            }
        }
    }

    fn pointer_move(&mut self, scene: &mut Scene, p: Point) {
        match &mut self.state {
            ToolState::Idle => {}
            ToolState::Placing { anchor, shape } => {
                Self::apply_placement(scene, *anchor, *shape, p);
            }
            ToolState::FreeDrawing { points } => {
                points.push(p);
            }
            ToolState::Editing {
                shape, mode, last, ..
            } => {
                let delta = p - *last;
                let result = match *mode {
                    EditMode::Translate => scene.translate_shape(*shape, delta),
                    EditMode::Resize(handle) => Self::apply_resize(scene, *shape, handle, p),
                };
                if let Err(e) = result {
                    log::debug!("edit frame skipped: {e}");
                }
                *last = p;
            }
        }
    }

    fn pointer_up(&mut self, scene: &mut Scene, p: Point) -> Option<GestureEffect> {
        match std::mem::take(&mut self.state) {
            ToolState::Idle => None,
            ToolState::Placing { anchor, shape } => {
                Self::apply_placement(scene, anchor, shape, p);
                Some(GestureEffect::Added(shape))
            }
            ToolState::FreeDrawing { mut points } => {
                if points.last() != Some(&p) {
                    points.push(p);
                }
                let mut stroke = Stroke::new(scene.active_layer(), points);
                stroke.style = if self.tool == ToolKind::Eraser {
                    self.settings.eraser_style()
                } else {
                    self.settings.style()
                };
                match scene.create_shape(Shape::Stroke(stroke)) {
                    Ok(id) => Some(GestureEffect::Added(id)),
                    Err(e) => {
                        log::debug!("stroke refused: {e}");
                        None
                    }
                }
            }
            ToolState::Editing {
                shape, mode, last, ..
            } => {
                let result = match mode {
                    EditMode::Translate => scene.translate_shape(shape, p - last),
                    EditMode::Resize(handle) => Self::apply_resize(scene, shape, handle, p),
                };
                if let Err(e) = result {
                    log::debug!("final edit frame skipped: {e}");
                }
                Some(GestureEffect::Modified(shape))
            }
        }
    }

    /// Recompute the provisional shape's extent from anchor to pointer.
    fn apply_placement(scene: &mut Scene, anchor: Point, shape: ShapeId, p: Point) {
        let patch = match scene.shape(shape) {
            Some(Shape::Ellipse(_)) => {
                GeometryPatch::radius(geometry::radius_from_drag(anchor, p))
            }
            _ => GeometryPatch::from_rect(geometry::rect_from_drag(anchor, p)),
        };
        if let Err(e) = scene.update_shape_geometry(shape, &patch) {
            log::warn!("placement update failed: {e}");
        }
    }

    fn apply_resize(
        scene: &mut Scene,
        shape: ShapeId,
        handle: Handle,
        p: Point,
    ) -> Result<(), crate::scene::SceneError> {
        let Some(target) = scene.shape(shape) else {
            return Err(crate::scene::SceneError::UnknownShape(shape));
        };
        let patch = match target {
            Shape::Rectangle(_) => {
                let fixed = handle.opposite_corner(target.bounds());
                GeometryPatch::from_rect(geometry::rect_from_drag(fixed, p))
            }
            Shape::Ellipse(e) => GeometryPatch::radius(geometry::radius_from_drag(e.center, p)),
            // Only rectangles and circles get resize handles.
            Shape::TextBox(_) | Shape::Stroke(_) => return Ok(()),
        };
        scene.update_shape_geometry(shape, &patch)
    }
}
