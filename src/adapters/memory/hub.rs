//! In-process authoritative room hub.
//!
//! The hub plays the server's part of the protocol entirely in memory:
//! on attach it answers with an `all` snapshot of the room's log, and
//! every inbound `add`/`update` is applied to that log and echoed to all
//! members of the room, including the sender.
//!
//! # Architecture
//!
//! ```text
//! Room: abc            Room: lobby
//! ├── connection-1     ├── connection-3
//! └── connection-2     └── connection-4
//! ```
//!
//! Each room owns one authoritative [`RoomLog`] and one broadcast
//! channel. Reusing the reconciler for the authoritative log keeps the
//! hub's defensive merge rules identical to every client's, which the
//! protocol's convergence depends on.
//!
//! Used by the integration tests and by local runs without a server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tracing::{debug, warn};

use crate::domain::foundation::RoomId;
use crate::domain::room::{ChatMessage, Event, RoomLog};
use crate::ports::{RoomConnection, RoomTransport, TransportError};

/// One room's server-side state.
#[derive(Clone)]
struct RoomHandle {
    log: Arc<Mutex<RoomLog>>,
    tx: broadcast::Sender<Event>,
}

/// In-process hub implementing [`RoomTransport`] as a loopback server.
///
/// # Thread Safety
///
/// The room registry sits behind an `RwLock` since event traffic (reads)
/// vastly outnumbers room creation (writes). Each room's log has its own
/// `Mutex`, so traffic in one room never blocks another.
pub struct MemoryHub {
    rooms: RwLock<HashMap<RoomId, RoomHandle>>,
    channel_capacity: usize,
    rejected_events: Arc<AtomicU64>,
}

impl MemoryHub {
    /// Creates a hub whose per-room channels buffer `channel_capacity`
    /// events.
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            channel_capacity,
            rejected_events: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a hub with the default capacity (128 events).
    pub fn with_default_capacity() -> Self {
        Self::new(128)
    }

    /// Number of structurally invalid events the hub has refused.
    pub fn rejected_events(&self) -> u64 {
        self.rejected_events.load(Ordering::Relaxed)
    }

    /// Names of rooms that have been attached to at least once.
    pub async fn active_rooms(&self) -> Vec<RoomId> {
        self.rooms.read().await.keys().cloned().collect()
    }

    /// Copy of a room's authoritative log, empty if the room is unknown.
    pub async fn authoritative_messages(&self, room_id: &RoomId) -> Vec<ChatMessage> {
        match self.rooms.read().await.get(room_id) {
            Some(room) => room.log.lock().await.messages().to_vec(),
            None => Vec::new(),
        }
    }

    async fn room(&self, room_id: &RoomId) -> RoomHandle {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                let (tx, _) = broadcast::channel(self.channel_capacity);
                RoomHandle {
                    log: Arc::new(Mutex::new(RoomLog::new(room_id.clone()))),
                    tx,
                }
            })
            .clone()
    }
}

impl Default for MemoryHub {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[async_trait]
impl RoomTransport for MemoryHub {
    async fn attach(&self, room_id: &RoomId) -> Result<RoomConnection, TransportError> {
        let room = self.room(room_id).await;

        let (inbound_tx, inbound_rx) = mpsc::channel(self.channel_capacity);
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<Event>(self.channel_capacity);

        // Subscribe before snapshotting: an event landing in between shows
        // up both in the snapshot and as an echo, and the id-keyed upsert
        // absorbs the repeat. The reverse order would lose it entirely.
        let mut broadcast_rx = room.tx.subscribe();
        let snapshot = room.log.lock().await.snapshot();
        inbound_tx
            .send(snapshot)
            .await
            .map_err(|_| TransportError::Detached)?;

        // Forward room traffic to this member until it detaches.
        let forward_tx = inbound_tx.clone();
        let forward_log = room.log.clone();
        tokio::spawn(async move {
            loop {
                match broadcast_rx.recv().await {
                    Ok(event) => {
                        if forward_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    // A lagged member has lost events it can never recover
                    // individually; a fresh snapshot restores consistency.
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "member lagged behind room traffic, resyncing");
                        let snapshot = forward_log.lock().await.snapshot();
                        if forward_tx.send(snapshot).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        // Apply this member's events to the authoritative log and echo
        // them to the whole room.
        let apply_log = room.log;
        let room_tx = room.tx;
        let rejected = self.rejected_events.clone();
        let apply_room = room_id.clone();
        tokio::spawn(async move {
            while let Some(event) = outbound_rx.recv().await {
                if let Err(error) = event.validate() {
                    rejected.fetch_add(1, Ordering::Relaxed);
                    warn!(room_id = %apply_room, %error, "rejected malformed event");
                    continue;
                }
                apply_log.lock().await.apply(event.clone());
                debug!(room_id = %apply_room, "applied and echoing event");
                // No receivers just means nobody is listening right now.
                let _ = room_tx.send(event);
            }
        });

        Ok(RoomConnection::new(outbound_tx, inbound_rx))
    }
}
