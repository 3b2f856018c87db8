use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ensemble settings, typically embedded in the harness's configuration file.
/// Loading the file itself is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// Base URLs of the worker processes, in fleet order
    pub workers: Vec<String>,
    /// Allocate roughly two consumer workers per producer; some backends need
    /// an extra listener-style worker for each producer
    #[serde(default)]
    pub extra_consumer_workers: bool,
    /// Per-request timeout in milliseconds; generous by default because
    /// worker-side setup (driver init, topic creation) can take minutes
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    300_000
}

impl EnsembleConfig {
    pub fn new(workers: Vec<String>) -> Self {
        EnsembleConfig {
            workers,
            extra_consumer_workers: false,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
