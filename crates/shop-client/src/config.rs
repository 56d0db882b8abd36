//! Client configuration.

use crate::poller::PollConfig;
use std::time::Duration;

/// Configuration for the storefront client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the storefront server (e.g. `http://localhost:5000`).
    pub base_url: String,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// How long a cached query stays fresh without being invalidated.
    pub cache_ttl: Duration,

    /// Payment status polling.
    pub poll: PollConfig,
}

impl ClientConfig {
    /// Defaults for everything but the server URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(300),
            poll: PollConfig::default(),
        }
    }
}
