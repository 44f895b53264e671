//! Presence and session model: user roster, status, chat log.
//!
//! Independent of the drawing stack; shares the transport with the sync
//! broadcaster.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Unique identifier for users.
pub type UserId = Uuid;

/// Attribution colors, assigned round-robin from the user id.
const USER_COLORS: [&str; 6] = [
    "#EF4444", // Red
    "#F59E0B", // Amber
    "#10B981", // Emerald
    "#3B82F6", // Blue
    "#8B5CF6", // Purple
    "#EC4899", // Pink
];

/// Presence status of a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Online,
    Offline,
    Typing,
}

/// A collaborator in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Avatar image URL.
    pub avatar: String,
    pub status: UserStatus,
    /// Color used to attribute shapes and cursors.
    pub color: String,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Build a user for a known id (e.g. a peer announced over the wire).
    /// Avatar and color are derived deterministically from the id so every
    /// client renders the peer the same way.
    pub fn with_id(id: UserId, name: impl Into<String>) -> Self {
        let bucket = id.as_bytes()[0] as usize % USER_COLORS.len();
        Self {
            id,
            name: name.into(),
            avatar: format!("https://api.dicebear.com/7.x/avataaars/svg?seed={id}"),
            status: UserStatus::Online,
            color: USER_COLORS[bucket].to_string(),
        }
    }
}

/// A chat message. The log is append-only; messages are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: UserId,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// The local user, the roster of known collaborators, and the chat log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    local: User,
    roster: Vec<User>,
    messages: Vec<ChatMessage>,
}

impl Session {
    /// Start a session for a named local user. The roster initially
    /// contains only the local user.
    pub fn new(local_name: impl Into<String>) -> Self {
        let local = User::new(local_name);
        Self {
            roster: vec![local.clone()],
            local,
            messages: Vec::new(),
        }
    }

    pub fn local_user(&self) -> &User {
        &self.local
    }

    pub fn local_id(&self) -> UserId {
        self.local.id
    }

    pub fn roster(&self) -> &[User] {
        &self.roster
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.roster.iter().find(|u| u.id == id)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Add or replace a roster entry (keyed by id).
    pub fn upsert_user(&mut self, user: User) {
        match self.roster.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => {
                log::info!("{} joined the session", user.name);
                self.roster.push(user);
            }
        }
    }

    /// Append a message from the local user. Empty or whitespace-only text
    /// is rejected locally: nothing is appended and `None` signals the
    /// broadcaster that there is nothing to emit.
    pub fn send_message(&mut self, text: &str) -> Option<ChatMessage> {
        if text.trim().is_empty() {
            log::debug!("ignoring empty chat message");
            return None;
        }
        let message = ChatMessage {
            id: Uuid::new_v4(),
            sender: self.local.id,
            text: text.to_string(),
            timestamp: now_millis(),
        };
        self.messages.push(message.clone());
        Some(message)
    }

    /// Append a message received from a peer, verbatim.
    pub fn append_remote(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Set the local user's status (also reflected in the roster).
    pub fn set_local_status(&mut self, status: UserStatus) {
        self.local.status = status;
        let id = self.local.id;
        self.apply_status(id, status);
    }

    /// Last-writer-wins status update for any user. Idempotent; unknown
    /// users are ignored.
    pub fn apply_status(&mut self, id: UserId, status: UserStatus) {
        match self.roster.iter_mut().find(|u| u.id == id) {
            Some(user) => user.status = status,
            None => log::debug!("status update for unknown user {id}"),
        }
        if id == self.local.id {
            self.local.status = status;
        }
    }
}
