//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `ROOMSYNC` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use roomsync::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Room server at {}", config.connection.server_url);
//! ```

mod client;
mod connection;
mod error;

pub use client::ClientConfig;
pub use connection::{ConnectionConfig, OfflineSendPolicy};
pub use error::{ConfigError, ValidationError};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has workable defaults, so a bare environment yields a
/// client that joins a random room on a local server under a pool name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Room channel connection (server URL, reconnect, offline policy)
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Client session (display name, room, logging)
    #[serde(default)]
    pub client: ClientConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `ROOMSYNC` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `ROOMSYNC__CONNECTION__SERVER_URL=ws://host:1999/parties/chat`
    /// - `ROOMSYNC__CLIENT__DISPLAY_NAME=Kapil`
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ROOMSYNC")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.connection.validate()?;
        self.client.validate()?;
        Ok(())
    }
}
