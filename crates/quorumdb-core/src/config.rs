//! Executor configuration.

use serde::Deserialize;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Tunables for the query executor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Upper bound on one storage operation, in milliseconds. A request that
    /// exceeds it fails with a consistency timeout.
    pub request_timeout_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ExecutorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
