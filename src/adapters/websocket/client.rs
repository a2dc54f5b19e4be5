//! WebSocket client transport with automatic reconnection.
//!
//! Each attachment spawns a connection worker that owns the socket for
//! its whole lifetime:
//! 1. Connect to `{server_url}/{room_id}`
//! 2. Pump frames both ways, decoding inbound JSON at the boundary
//! 3. On connection loss, retry with exponential backoff; the server
//!    answers every (re)connect with a fresh `all` snapshot
//!
//! Malformed inbound frames are dropped, counted and logged; they never
//! reach the session. Outbound events sent while disconnected are queued
//! or dropped according to the configured [`OfflineSendPolicy`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::config::{ConnectionConfig, OfflineSendPolicy};
use crate::domain::foundation::RoomId;
use crate::domain::room::{Event, EventValidationError};
use crate::ports::{RoomConnection, RoomTransport, TransportError};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Problems with an inbound frame, resolved by dropping the frame.
#[derive(Debug, Error)]
enum FrameError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid event: {0}")]
    Invalid(#[from] EventValidationError),
}

/// [`RoomTransport`] over a WebSocket server.
///
/// The room id becomes a URL path segment under the configured server
/// URL, so one transport value serves any number of rooms.
pub struct WebSocketTransport {
    config: ConnectionConfig,
    dropped_frames: Arc<AtomicU64>,
}

impl WebSocketTransport {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            dropped_frames: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of malformed inbound frames dropped across all rooms.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }

    fn room_url(&self, room_id: &RoomId) -> String {
        format!(
            "{}/{}",
            self.config.server_url.trim_end_matches('/'),
            room_id
        )
    }
}

#[async_trait]
impl RoomTransport for WebSocketTransport {
    /// Attaches lazily: the worker establishes (and re-establishes) the
    /// socket on its own, so a server that is briefly unreachable only
    /// delays the first snapshot rather than failing the attach.
    async fn attach(&self, room_id: &RoomId) -> Result<RoomConnection, TransportError> {
        let url = self.room_url(room_id);
        if !url.starts_with("ws://") && !url.starts_with("wss://") {
            return Err(TransportError::AttachFailed {
                room_id: room_id.clone(),
                reason: format!("unsupported url scheme: {url}"),
            });
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(self.config.channel_capacity);
        let (outbound_tx, outbound_rx) = mpsc::channel(self.config.channel_capacity);

        let worker = ConnectionWorker {
            url,
            room_id: room_id.clone(),
            inbound: inbound_tx,
            outbound: outbound_rx,
            policy: self.config.offline_send_policy,
            queue_capacity: self.config.offline_queue_capacity,
            backoff_initial: self.config.reconnect_initial(),
            backoff_max: self.config.reconnect_max(),
            dropped_frames: self.dropped_frames.clone(),
            pending: VecDeque::new(),
        };
        tokio::spawn(worker.run());

        Ok(RoomConnection::new(outbound_tx, inbound_rx))
    }
}

/// Why a pump run over one socket ended.
enum PumpEnd {
    /// The session dropped its connection handle; stop for good.
    Detached,
    /// The socket failed or closed; reconnect.
    Disconnected,
}

/// Owns one room attachment's socket across reconnects.
struct ConnectionWorker {
    url: String,
    room_id: RoomId,
    inbound: mpsc::Sender<Event>,
    outbound: mpsc::Receiver<Event>,
    policy: OfflineSendPolicy,
    queue_capacity: usize,
    backoff_initial: Duration,
    backoff_max: Duration,
    dropped_frames: Arc<AtomicU64>,
    /// Events accepted while offline, flushed on the next connect.
    pending: VecDeque<Event>,
}

impl ConnectionWorker {
    async fn run(mut self) {
        let mut delay = self.backoff_initial;
        loop {
            match connect_async(self.url.as_str()).await {
                Ok((socket, _response)) => {
                    info!(room_id = %self.room_id, "room channel connected");
                    delay = self.backoff_initial;
                    match self.pump(socket).await {
                        PumpEnd::Detached => return,
                        PumpEnd::Disconnected => {
                            info!(room_id = %self.room_id, "room channel lost, reconnecting");
                        }
                    }
                }
                Err(error) => {
                    warn!(room_id = %self.room_id, %error, "room channel connect failed");
                }
            }

            if !self.wait_retry(delay).await {
                return;
            }
            delay = (delay * 2).min(self.backoff_max);
        }
    }

    /// Services one live socket until it fails or the session detaches.
    async fn pump(&mut self, socket: Socket) -> PumpEnd {
        let (mut sink, mut stream) = socket.split();

        // Events stashed while offline go out first, in original order.
        while let Some(event) = self.pending.pop_front() {
            if let Err(error) = Self::transmit(&mut sink, &event).await {
                warn!(room_id = %self.room_id, %error, "room channel write failed");
                Self::stash_offline(
                    &mut self.pending,
                    self.policy,
                    self.queue_capacity,
                    &self.room_id,
                    event,
                );
                return PumpEnd::Disconnected;
            }
        }

        let ConnectionWorker {
            room_id,
            inbound,
            outbound,
            policy,
            queue_capacity,
            dropped_frames,
            pending,
            ..
        } = self;

        loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => match decode(&text) {
                        Ok(event) => {
                            if inbound.send(event).await.is_err() {
                                return PumpEnd::Detached;
                            }
                        }
                        Err(error) => {
                            dropped_frames.fetch_add(1, Ordering::Relaxed);
                            warn!(room_id = %room_id, %error, "dropped malformed frame");
                        }
                    },
                    Some(Ok(Message::Ping(payload))) => {
                        if sink.send(Message::Pong(payload)).await.is_err() {
                            return PumpEnd::Disconnected;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return PumpEnd::Disconnected,
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        warn!(room_id = %room_id, %error, "room channel read failed");
                        return PumpEnd::Disconnected;
                    }
                },
                maybe = outbound.recv() => match maybe {
                    Some(event) => {
                        if let Err(error) = Self::transmit(&mut sink, &event).await {
                            warn!(room_id = %room_id, %error, "room channel write failed");
                            Self::stash_offline(pending, *policy, *queue_capacity, room_id, event);
                            return PumpEnd::Disconnected;
                        }
                    }
                    None => return PumpEnd::Detached,
                },
            }
        }
    }

    /// Sleeps out the backoff window while honoring the offline policy
    /// for sends that arrive in the meantime.
    ///
    /// Returns `false` once the session has detached.
    async fn wait_retry(&mut self, delay: Duration) -> bool {
        let ConnectionWorker {
            room_id,
            outbound,
            policy,
            queue_capacity,
            pending,
            ..
        } = self;

        let retry = tokio::time::sleep(delay);
        tokio::pin!(retry);
        loop {
            tokio::select! {
                _ = &mut retry => return true,
                maybe = outbound.recv() => match maybe {
                    Some(event) => {
                        Self::stash_offline(pending, *policy, *queue_capacity, room_id, event);
                    }
                    None => return false,
                },
            }
        }
    }

    fn stash_offline(
        pending: &mut VecDeque<Event>,
        policy: OfflineSendPolicy,
        capacity: usize,
        room_id: &RoomId,
        event: Event,
    ) {
        match policy {
            OfflineSendPolicy::Queue => {
                if pending.len() >= capacity {
                    pending.pop_front();
                    warn!(room_id = %room_id, "offline queue full, dropping oldest event");
                }
                pending.push_back(event);
            }
            OfflineSendPolicy::Drop => {
                debug!(room_id = %room_id, "disconnected, dropping outbound event");
            }
        }
    }

    async fn transmit(
        sink: &mut SplitSink<Socket, Message>,
        event: &Event,
    ) -> Result<(), tokio_tungstenite::tungstenite::Error> {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(error) => {
                warn!(%error, "failed to encode outbound event, skipping");
                return Ok(());
            }
        };
        sink.send(Message::Text(json)).await
    }
}

fn decode(text: &str) -> Result<Event, FrameError> {
    let event: Event = serde_json::from_str(text)?;
    event.validate()?;
    Ok(event)
}
