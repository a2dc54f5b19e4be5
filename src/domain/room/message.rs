//! Chat message entry and sender role.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp};

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human participant.
    User,
    /// An automated participant.
    Assistant,
}

/// A single entry in a room's message log.
///
/// # Invariants
///
/// - `id` is unique within a room's log and never changes once assigned
/// - `ts` is always resolved: entries built from wire data without a
///   timestamp receive the local receipt time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier, assigned by the originating client.
    pub id: MessageId,
    /// The message text.
    pub content: String,
    /// Display name of the sender; treated as an opaque string.
    pub user: String,
    /// Sender role.
    pub role: Role,
    /// Advisory display timestamp, epoch milliseconds.
    pub ts: Timestamp,
}

impl ChatMessage {
    /// Builds a message entry with an already-resolved timestamp.
    pub fn new(
        id: MessageId,
        content: impl Into<String>,
        user: impl Into<String>,
        role: Role,
        ts: Timestamp,
    ) -> Self {
        Self {
            id,
            content: content.into(),
            user: user.into(),
            role,
            ts,
        }
    }

    /// Returns true if this message was sent by a human participant.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
