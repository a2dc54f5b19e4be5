//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Server URL must use the ws:// or wss:// scheme")]
    InvalidServerUrl,

    #[error("Reconnect delays must be non-zero and initial <= max")]
    InvalidReconnectWindow,

    #[error("Channel capacity must be non-zero")]
    InvalidChannelCapacity,

    #[error("Offline queue capacity must be non-zero")]
    InvalidQueueCapacity,

    #[error("Display name cannot be blank")]
    BlankDisplayName,

    #[error("Room name cannot be blank")]
    BlankRoom,
}
