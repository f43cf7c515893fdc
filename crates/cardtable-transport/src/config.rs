//! Connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the channel to the relay.
///
/// The defaults point at a relay on the local machine, which is what the
/// development server listens on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Full endpoint URL, e.g. `ws://127.0.0.1:8000/ws`.
    pub url: String,

    /// How long opening the channel may take before it counts as a
    /// transport failure.
    pub connect_timeout: Duration,
}

impl ConnectionConfig {
    /// Default endpoint of a locally running relay.
    pub const DEFAULT_URL: &'static str = "ws://127.0.0.1:8000/ws";

    /// Creates a config for `url` with the default timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Builds the relay endpoint URL `<scheme>://<host>:<port>/ws`.
    pub fn endpoint_url(scheme: &str, host: &str, port: u16) -> String {
        format!("{scheme}://{host}:{port}/ws")
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: Self::DEFAULT_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}
