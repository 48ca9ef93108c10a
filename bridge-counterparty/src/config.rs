use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hashing::HashFunction;

// 24 hours, the protocol-wide lock window
pub const DEFAULT_LOCK_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterpartyConfig {
    // Added to the lock time to get the deadline. Never caller supplied.
    #[serde(with = "humantime_serde")]
    pub lock_window: Duration,
    // Must match the hash function of the initiating side
    pub hash_function: HashFunction,
    // Buffer of the broadcast channel events are published on
    pub event_channel_capacity: usize,
}

impl Default for CounterpartyConfig {
    fn default() -> Self {
        CounterpartyConfig {
            lock_window: DEFAULT_LOCK_WINDOW,
            hash_function: HashFunction::Keccak256,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl CounterpartyConfig {
    /// Parses a JSON config. Missing fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: CounterpartyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock_window.as_secs() == 0 {
            return Err(ConfigError::Invalid("lock_window must be at least one second".to_string()));
        }
        if self.event_channel_capacity == 0 {
            return Err(ConfigError::Invalid("event_channel_capacity must be positive".to_string()));
        }
        Ok(())
    }

    pub fn lock_window_secs(&self) -> u64 {
        self.lock_window.as_secs()
    }
}
