//! Server configuration and seed data.

use std::{path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Channel, ChannelId, UserId};

/// Runtime settings of the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Commands queued for the hub before callers start to wait
    pub hub_command_buffer: usize,
    /// Frames queued per connection before the hub treats it as stalled
    pub outbound_buffer: usize,
    /// How long a direct reply may wait for room in the outbound queue
    pub reply_timeout: Duration,
    /// Bound on a single message persistence call
    pub persistence_timeout: Duration,
    /// Largest accepted upload body
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            hub_command_buffer: 1024,
            outbound_buffer: 64,
            reply_timeout: Duration::from_secs(1),
            persistence_timeout: Duration::from_secs(5),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read seed file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid seed data: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSeed {
    pub id: ChannelId,
    #[serde(default)]
    pub persistence_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSeed {
    pub token: String,
    pub user_id: UserId,
}

/// Channels and session tokens loaded into the in-memory collaborators at startup
///
/// ```json
/// {
///   "channels": [{ "id": "general", "persistenceEnabled": true }],
///   "sessions": [{ "token": "secret", "userId": "alice" }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub channels: Vec<ChannelSeed>,
    #[serde(default)]
    pub sessions: Vec<SessionSeed>,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.channels
            .iter()
            .map(|seed| Channel::new(seed.id.clone(), seed.persistence_enabled))
    }

    pub fn sessions(&self) -> impl Iterator<Item = (String, UserId)> + '_ {
        self.sessions
            .iter()
            .map(|seed| (seed.token.clone(), seed.user_id.clone()))
    }
}
