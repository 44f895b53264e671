//! Pointer input events.
//!
//! The host wires its raw mouse/touch events into these once; the tool
//! state machine consumes them independently of any render cycle.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A pointer event in canvas-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down(p) | PointerEvent::Move(p) | PointerEvent::Up(p) => *p,
        }
    }

    /// Malformed (NaN/infinite) coordinates are rejected at this boundary,
    /// before any geometry runs.
    pub fn is_finite(&self) -> bool {
        let p = self.position();
        p.x.is_finite() && p.y.is_finite()
    }
}
