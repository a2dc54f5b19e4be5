//! RoomTransport port - Interface for room-scoped event streams.
//!
//! This port defines how a session reaches the shared room stream without
//! knowing about the underlying transport (WebSocket, in-process hub, ...).

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::foundation::RoomId;
use crate::domain::room::Event;

/// Errors raised at the transport seam.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The room could not be attached at all (bad URL, refused handshake).
    #[error("could not attach to room {room_id}: {reason}")]
    AttachFailed { room_id: RoomId, reason: String },

    /// The connection's worker is gone; the session has effectively
    /// detached from the room.
    #[error("room channel is detached")]
    Detached,
}

/// Port for attaching to a named room's bidirectional event stream.
///
/// Implementations must ensure:
/// - `attach` may be called again after a disconnect to rejoin the same
///   room; the server side replies with a fresh `all` snapshot that the
///   receiver treats as fully authoritative
/// - inbound events are delivered one at a time, in the order the
///   transport received them
/// - malformed frames never reach the returned connection; they are
///   dropped, counted and logged inside the adapter
#[async_trait]
pub trait RoomTransport: Send + Sync {
    /// Attaches to `room_id` and returns the bidirectional connection.
    async fn attach(&self, room_id: &RoomId) -> Result<RoomConnection, TransportError>;
}

/// A live attachment to one room: an outbound sender and an inbound
/// receiver pair serviced by an adapter-owned worker.
///
/// Dropping the connection detaches from the room and cancels the
/// worker's pending reconnection attempts.
pub struct RoomConnection {
    outbound: mpsc::Sender<Event>,
    inbound: mpsc::Receiver<Event>,
}

impl RoomConnection {
    /// Builds a connection from its two channel halves.
    ///
    /// Called by adapters; sessions only consume the returned value.
    pub fn new(outbound: mpsc::Sender<Event>, inbound: mpsc::Receiver<Event>) -> Self {
        Self { outbound, inbound }
    }

    /// Transmits one event to the room's shared stream.
    ///
    /// Fire-and-forget: there is no delivery acknowledgment. The sender
    /// learns of success only by observing its own event echoed back
    /// through the inbound stream, keyed by id.
    pub async fn send(&self, event: Event) -> Result<(), TransportError> {
        self.outbound
            .send(event)
            .await
            .map_err(|_| TransportError::Detached)
    }

    /// Waits for the next inbound event.
    ///
    /// Returns `None` once the worker has shut down.
    pub async fn recv(&mut self) -> Option<Event> {
        self.inbound.recv().await
    }

    /// Returns an already-delivered event without waiting, if any.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.inbound.try_recv().ok()
    }
}
