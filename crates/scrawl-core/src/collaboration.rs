//! Sync broadcaster: the bridge between local mutations and peers.
//!
//! Outbound, it turns completed gestures and session changes into wire
//! events. Inbound, it applies peer events to the local scene and session
//! with last-writer-wins semantics, never re-emitting what it applies.

use crate::scene::Scene;
use crate::session::{ChatMessage, Session, User, UserId, UserStatus};
use crate::shapes::Shape;
use crate::sync::{Transport, WireEvent};
use crate::tools::GestureEffect;

/// Broadcasts local mutations and applies inbound peer events.
#[derive(Debug, Clone)]
pub struct SyncBroadcaster<T: Transport> {
    local_user: UserId,
    transport: T,
}

impl<T: Transport> SyncBroadcaster<T> {
    pub fn new(local_user: UserId, transport: T) -> Self {
        Self {
            local_user,
            transport,
        }
    }

    pub fn local_user(&self) -> UserId {
        self.local_user
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Send an event, degrading to local-only operation on failure. There
    /// is no queueing: a failed send is logged and forgotten.
    fn emit(&mut self, event: WireEvent) {
        if let Err(e) = self.transport.send(&event) {
            log::warn!("sync send failed, continuing local-only: {e}");
        }
    }

    // --- Outbound ---

    /// Announce the local user to peers on session start.
    pub fn announce_join(&mut self, user: &User) {
        self.emit(WireEvent::UserJoined {
            user_id: user.id,
            user_name: user.name.clone(),
        });
    }

    /// Broadcast the outcome of a completed gesture: one event per
    /// gesture, carrying the full shape snapshot.
    pub fn gesture_completed(&mut self, scene: &Scene, effect: GestureEffect) {
        let (id, added) = match effect {
            GestureEffect::Added(id) => (id, true),
            GestureEffect::Modified(id) => (id, false),
        };
        let Some(shape) = scene.shape(id) else {
            log::warn!("gesture effect for missing shape {id}, nothing to broadcast");
            return;
        };
        let object = shape.clone();
        let event = if added {
            WireEvent::ObjectAdded {
                user_id: self.local_user,
                object,
            }
        } else {
            WireEvent::ObjectModified {
                user_id: self.local_user,
                object,
            }
        };
        self.emit(event);
    }

    /// Broadcast a shape snapshot directly, when the caller already holds
    /// the finalized shape instead of a [`GestureEffect`].
    pub fn shape_added(&mut self, shape: &Shape) {
        self.emit(WireEvent::ObjectAdded {
            user_id: self.local_user,
            object: shape.clone(),
        });
    }

    pub fn shape_modified(&mut self, shape: &Shape) {
        self.emit(WireEvent::ObjectModified {
            user_id: self.local_user,
            object: shape.clone(),
        });
    }

    pub fn status_changed(&mut self, status: UserStatus) {
        self.emit(WireEvent::UpdateStatus {
            user_id: self.local_user,
            status,
        });
    }

    /// Broadcast a chat message previously appended by
    /// `Session::send_message`.
    pub fn message_sent(&mut self, message: &ChatMessage) {
        self.emit(WireEvent::SendMessage {
            id: message.id,
            user_id: message.sender,
            text: message.text.clone(),
            timestamp: message.timestamp,
        });
    }

    // --- Inbound ---

    /// Apply a peer event to the local scene and session.
    ///
    /// Events originating from the local user are ignored (loop
    /// prevention). Shape payloads are applied last-writer-wins: the
    /// snapshot fully replaces local state, and a `modified` event for an
    /// unknown shape self-heals into an insert. Nothing applied here is
    /// re-emitted.
    pub fn apply(&self, scene: &mut Scene, session: &mut Session, event: WireEvent) {
        if event.sender() == self.local_user {
            log::debug!("ignoring echoed event from local user");
            return;
        }
        match event {
            WireEvent::UserJoined { user_id, user_name } => {
                session.upsert_user(User::with_id(user_id, user_name));
            }
            WireEvent::ObjectAdded { object, .. } => {
                scene.upsert_shape(object);
            }
            WireEvent::ObjectModified { object, .. } => {
                // Unknown ids are inserted: a missed creation event heals here.
                scene.upsert_shape(object);
            }
            WireEvent::UpdateStatus { user_id, status } => {
                session.apply_status(user_id, status);
            }
            WireEvent::SendMessage {
                id,
                user_id,
                text,
                timestamp,
            } => {
                session.append_remote(ChatMessage {
                    id,
                    sender: user_id,
                    text,
                    timestamp,
                });
            }
        }
    }
}
