//! Room channel connection configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Room channel connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Base WebSocket URL of the room server; the room id is appended
    /// as a path segment
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// First reconnect delay after a connection loss, in milliseconds
    #[serde(default = "default_reconnect_initial_ms")]
    pub reconnect_initial_ms: u64,

    /// Reconnect delay ceiling, in milliseconds
    #[serde(default = "default_reconnect_max_ms")]
    pub reconnect_max_ms: u64,

    /// Buffer size of the per-connection event channels
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// What happens to sends issued while disconnected
    #[serde(default)]
    pub offline_send_policy: OfflineSendPolicy,

    /// How many offline sends the queue policy retains
    #[serde(default = "default_offline_queue_capacity")]
    pub offline_queue_capacity: usize,
}

/// Disposition of events sent while the channel is down.
///
/// Either way the optimistic local mutation has already happened; this
/// only decides whether the event still reaches the room after
/// reconnecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OfflineSendPolicy {
    /// Hold events (bounded, oldest dropped first) and flush on reconnect
    #[default]
    Queue,
    /// Discard events immediately
    Drop,
}

impl ConnectionConfig {
    /// First reconnect delay
    pub fn reconnect_initial(&self) -> Duration {
        Duration::from_millis(self.reconnect_initial_ms)
    }

    /// Reconnect delay ceiling
    pub fn reconnect_max(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_ms)
    }

    /// Validate connection configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.server_url.starts_with("ws://") && !self.server_url.starts_with("wss://") {
            return Err(ValidationError::InvalidServerUrl);
        }
        if self.reconnect_initial_ms == 0 || self.reconnect_initial_ms > self.reconnect_max_ms {
            return Err(ValidationError::InvalidReconnectWindow);
        }
        if self.channel_capacity == 0 {
            return Err(ValidationError::InvalidChannelCapacity);
        }
        if self.offline_queue_capacity == 0 {
            return Err(ValidationError::InvalidQueueCapacity);
        }
        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            reconnect_initial_ms: default_reconnect_initial_ms(),
            reconnect_max_ms: default_reconnect_max_ms(),
            channel_capacity: default_channel_capacity(),
            offline_send_policy: OfflineSendPolicy::default(),
            offline_queue_capacity: default_offline_queue_capacity(),
        }
    }
}

fn default_server_url() -> String {
    "ws://127.0.0.1:1999/parties/chat".to_string()
}

fn default_reconnect_initial_ms() -> u64 {
    250
}

fn default_reconnect_max_ms() -> u64 {
    10_000
}

fn default_channel_capacity() -> usize {
    128
}

fn default_offline_queue_capacity() -> usize {
    64
}
