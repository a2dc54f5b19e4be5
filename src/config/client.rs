//! Client session configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Client session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Display name to appear as; drawn from the built-in pool when unset
    pub display_name: Option<String>,

    /// Room to join; a fresh random room name is generated when unset
    pub room: Option<String>,

    /// Rust log filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ClientConfig {
    /// Validate client configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.display_name {
            if name.trim().is_empty() {
                return Err(ValidationError::BlankDisplayName);
            }
        }
        if let Some(room) = &self.room {
            if room.trim().is_empty() {
                return Err(ValidationError::BlankRoom);
            }
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            display_name: None,
            room: None,
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info,roomsync=debug".to_string()
}
