//! Scrawl Core Library
//!
//! The interaction engine of the Scrawl shared canvas: the tool state
//! machine that turns pointer input into shape operations, the scene model
//! it mutates, and the sync layer that announces completed edits to peers
//! and reconciles theirs. Rendering, the real socket, and all UI live in
//! the host application; this crate is deliberately free of them.

pub mod collaboration;
pub mod geometry;
pub mod input;
pub mod scene;
pub mod session;
pub mod shapes;
pub mod sync;
pub mod tools;

pub use collaboration::SyncBroadcaster;
pub use input::PointerEvent;
pub use scene::{Layer, Scene, SceneError};
pub use session::{ChatMessage, Session, User, UserId, UserStatus};
pub use shapes::{Color, GeometryPatch, LayerId, Shape, ShapeId, ShapeStyle};
pub use sync::{LoopbackTransport, NullTransport, Transport, TransportError, WireEvent};
pub use tools::{DrawSettings, GestureEffect, ToolController, ToolKind, ToolState};
