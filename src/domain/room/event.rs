//! Wire-level event union for room synchronization.
//!
//! Every frame exchanged with a room is one of three events:
//! - `add` - introduce a new message
//! - `update` - replace the fields of an existing message by id
//! - `all` - full authoritative snapshot of the room's log, sent on (re)join
//!
//! Field names and tags match the JSON protocol exactly; an event missing a
//! required field fails deserialization at the transport boundary and never
//! reaches the reconciler.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{MessageId, Timestamp};
use crate::domain::room::{ChatMessage, Role};

/// All event types carried over a room channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    /// Introduce a new message.
    Add(WireMessage),
    /// Replace the fields of the message with the same id.
    Update(WireMessage),
    /// Full authoritative snapshot, replacing the receiver's local view.
    All(Snapshot),
}

/// Message fields as they travel on the wire.
///
/// `ts` is optional on the wire; receivers substitute their own local time
/// at the moment of processing when it is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub id: MessageId,
    pub content: String,
    pub user: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<Timestamp>,
}

/// Payload of an `all` event: the room's log in authoritative order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub messages: Vec<WireMessage>,
}

/// Structural problems in an otherwise well-formed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EventValidationError {
    #[error("event id cannot be empty")]
    EmptyId,
    #[error("event user cannot be empty")]
    EmptyUser,
}

impl WireMessage {
    /// Builds the wire form of a locally stored message.
    pub fn from_message(message: &ChatMessage) -> Self {
        Self {
            id: message.id.clone(),
            content: message.content.clone(),
            user: message.user.clone(),
            role: message.role,
            ts: Some(message.ts),
        }
    }

    /// Resolves the wire form into a stored entry, substituting
    /// `received_at` when no timestamp was carried.
    pub fn into_message(self, received_at: Timestamp) -> ChatMessage {
        ChatMessage {
            id: self.id,
            content: self.content,
            user: self.user,
            role: self.role,
            ts: self.ts.unwrap_or(received_at),
        }
    }

    fn validate(&self) -> Result<(), EventValidationError> {
        if self.id.is_empty() {
            return Err(EventValidationError::EmptyId);
        }
        if self.user.is_empty() {
            return Err(EventValidationError::EmptyUser);
        }
        Ok(())
    }
}

impl Event {
    /// Checks structural rules serde cannot express.
    ///
    /// Snapshots are always accepted: individual entries with degenerate
    /// ids still replace the local view wholesale, which is the safer
    /// behavior for an authoritative event.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        match self {
            Event::Add(message) | Event::Update(message) => message.validate(),
            Event::All(_) => Ok(()),
        }
    }
}
