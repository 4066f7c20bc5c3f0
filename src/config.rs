//! Session store configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::session::DEFAULT_CACHE_CAPACITY;

/// Session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Path to the session document store (redb database file).
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Maximum number of session names kept in the in-process cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Deadline for each request's document store calls, in seconds.
    /// Zero disables the deadline.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_store_path() -> String {
    "/var/lib/zentinel-sessions/sessions.redb".to_string()
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            cache_capacity: default_cache_capacity(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl StoreConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.store_path.is_empty() {
            return Err("store_path must not be empty".to_string());
        }

        if self.cache_capacity == 0 {
            return Err("cache_capacity must be at least 1".to_string());
        }

        Ok(())
    }

    /// Per-request deadline, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// JSON overrides for the store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfigJson {
    pub store_path: Option<String>,
    pub cache_capacity: Option<usize>,
    pub request_timeout_secs: Option<u64>,
}

impl StoreConfigJson {
    /// Apply JSON config to existing config.
    pub fn apply_to(&self, config: &mut StoreConfig) {
        if let Some(ref path) = self.store_path {
            config.store_path = path.clone();
        }
        if let Some(capacity) = self.cache_capacity {
            config.cache_capacity = capacity;
        }
        if let Some(timeout) = self.request_timeout_secs {
            config.request_timeout_secs = timeout;
        }
    }
}
