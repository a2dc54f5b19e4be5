//! RoomSession - one client's attachment to one room.
//!
//! The session owns the local message log and the transport connection,
//! and is the single call path that mutates the log: optimistic local
//! appends on submit, and inbound event application when the caller
//! drains the connection. No other component touches the log, so no
//! locking is needed.

use thiserror::Error;
use tracing::warn;

use crate::domain::foundation::{MessageId, RoomId};
use crate::domain::room::{Applied, ChatMessage, Event, RoomLog, WireMessage};
use crate::ports::{RoomConnection, RoomTransport, TransportError};

use super::compose_message::{MessageComposer, SubmitError};
use super::identity::ClientIdentity;

/// Errors that can occur when editing a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Replacement text is empty or whitespace only.
    #[error("message content cannot be empty")]
    EmptyContent,

    /// The id does not name a message in the local log. Editing is a
    /// local intent, so unlike the receive path there is no defensive
    /// create here.
    #[error("no message with id {0} in the local log")]
    UnknownMessage(MessageId),
}

/// A client's live view of one room.
///
/// Created empty on attach; the server's first `all` snapshot populates
/// it. Discard the session to detach: dropping it cancels the
/// transport's pending reconnection attempts along with the log.
pub struct RoomSession {
    log: RoomLog,
    connection: RoomConnection,
    composer: MessageComposer,
}

impl RoomSession {
    /// Attaches to a room through the given transport.
    pub async fn attach(
        transport: &dyn RoomTransport,
        room_id: RoomId,
        identity: ClientIdentity,
    ) -> Result<Self, TransportError> {
        let connection = transport.attach(&room_id).await?;
        Ok(Self {
            log: RoomLog::new(room_id),
            connection,
            composer: MessageComposer::new(identity),
        })
    }

    pub fn room_id(&self) -> &RoomId {
        self.log.room_id()
    }

    pub fn identity(&self) -> &ClientIdentity {
        self.composer.identity()
    }

    /// The reconciled message list, in display order. Read-only; the
    /// presentation layer renders from this.
    pub fn messages(&self) -> &[ChatMessage] {
        self.log.messages()
    }

    /// Submits new message text.
    ///
    /// The composed entry lands in the local log immediately, before any
    /// server round-trip; the equivalent `add` event is transmitted
    /// independently, and the server's echo is absorbed as an in-place
    /// replace of the same id. Returns the id assigned to the message.
    pub async fn submit(&mut self, text: &str) -> Result<MessageId, SubmitError> {
        let message = self.composer.compose(text)?;
        let id = message.id.clone();
        let event = Event::Add(WireMessage::from_message(&message));

        self.log.append_local(message);
        self.transmit(event).await;
        Ok(id)
    }

    /// Replaces the text of an existing message in place.
    ///
    /// Mirrors `submit`: local mutation first, then the `update` event.
    pub async fn edit(&mut self, id: &MessageId, text: &str) -> Result<(), EditError> {
        let original = self
            .log
            .get(id)
            .ok_or_else(|| EditError::UnknownMessage(id.clone()))?;
        let revised = self
            .composer
            .revise(original, text)
            .map_err(|_| EditError::EmptyContent)?;
        let event = Event::Update(WireMessage::from_message(&revised));

        self.log.append_local(revised);
        self.transmit(event).await;
        Ok(())
    }

    /// Waits for the next inbound event and applies it to the log.
    ///
    /// Events are applied one at a time, in delivery order. Returns
    /// `None` once the transport has shut down for good.
    pub async fn next_event(&mut self) -> Option<Applied> {
        let event = self.connection.recv().await?;
        Some(self.log.apply(event))
    }

    /// Applies every event already delivered without waiting.
    ///
    /// Returns how many events were applied.
    pub fn apply_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.connection.try_recv() {
            self.log.apply(event);
            applied += 1;
        }
        applied
    }

    /// Fire-and-forget transmission. A detached channel is not an error
    /// for the caller: the optimistic entry stays visible locally and
    /// the next authoritative snapshot supersedes it.
    async fn transmit(&self, event: Event) {
        if self.connection.send(event).await.is_err() {
            warn!(room_id = %self.log.room_id(), "room channel detached, event not transmitted");
        }
    }
}
