//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use ots_core::Limits;

/// Default calendar servers (Alice and Bob).
pub const DEFAULT_CALENDARS: [&str; 2] = [
    "https://alice.btc.calendar.opentimestamps.org",
    "https://bob.btc.calendar.opentimestamps.org",
];

/// Default esplora-compatible block explorers, primary first.
pub const DEFAULT_EXPLORERS: [&str; 2] =
    ["https://blockstream.info/api", "https://mempool.space/api"];

/// Configuration for the OTS client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Calendar servers to submit to and upgrade from, in order.
    pub calendar_servers: Vec<String>,
    /// Ordered fallback list of block explorers.
    pub block_explorers: Vec<String>,
    /// Per-request timeout, applied independently to every outbound
    /// HTTP request.
    pub request_timeout: Duration,
    /// Maximum length of a single varbytes field when parsing.
    pub max_varbytes: usize,
    /// Maximum proof-tree depth for parsing and walking.
    pub max_depth: usize,
    /// Maximum calendar response body size.
    pub max_calendar_response_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            calendar_servers: DEFAULT_CALENDARS.iter().map(|s| s.to_string()).collect(),
            block_explorers: DEFAULT_EXPLORERS.iter().map(|s| s.to_string()).collect(),
            request_timeout: Duration::from_secs(10),
            max_varbytes: 1 << 20,
            max_depth: 256,
            max_calendar_response_bytes: 64 * 1024,
        }
    }
}

impl ClientConfig {
    /// Create a configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parser limits derived from this configuration.
    pub(crate) fn limits(&self) -> Limits {
        Limits {
            max_varbytes: self.max_varbytes,
            max_depth: self.max_depth,
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the calendar servers.
    pub fn calendar_servers<I, S>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.calendar_servers = servers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the block explorers.
    pub fn block_explorers<I, S>(mut self, explorers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.block_explorers = explorers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the varbytes cap.
    pub fn max_varbytes(mut self, max: usize) -> Self {
        self.config.max_varbytes = max;
        self
    }

    /// Set the tree depth cap.
    pub fn max_depth(mut self, max: usize) -> Self {
        self.config.max_depth = max;
        self
    }

    /// Set the calendar response body cap.
    pub fn max_calendar_response_bytes(mut self, max: usize) -> Self {
        self.config.max_calendar_response_bytes = max;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
