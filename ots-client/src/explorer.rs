//! Bitcoin block lookup via esplora-compatible explorers.
//!
//! Two GETs per explorer: `/block-height/{h}` returns the block hash as
//! plain text, `/block/{hash}` returns the block metadata as JSON. The
//! configured explorers are tried in order; the lookup fails only when
//! every explorer fails.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{ClientError, Result};
use crate::http::{HttpRequest, HttpTransport};

/// Metadata for one Bitcoin block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block height.
    pub height: u64,
    /// Block hash, big-endian hex (explorer display order).
    pub block_hash: String,
    /// Merkle root, big-endian hex (explorer display order).
    pub merkle_root: String,
    /// Block timestamp, unix seconds.
    pub timestamp: i64,
}

impl BlockInfo {
    /// Block time as a UTC datetime.
    pub fn block_time_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Source of Bitcoin block metadata.
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Fetch block metadata by height.
    async fn block_at_height(&self, height: u64) -> Result<BlockInfo>;
}

/// The esplora block JSON fields the client consumes.
#[derive(Debug, Deserialize)]
struct EsploraBlock {
    merkle_root: String,
    timestamp: i64,
}

/// Block source querying public esplora-compatible explorers in order.
pub struct EsploraBlockSource {
    transport: Arc<dyn HttpTransport>,
    explorers: Vec<String>,
    timeout: Duration,
}

impl EsploraBlockSource {
    /// Create a block source over the given explorer base URLs.
    pub fn new(transport: Arc<dyn HttpTransport>, explorers: Vec<String>, timeout: Duration) -> Self {
        Self {
            transport,
            explorers,
            timeout,
        }
    }

    async fn try_explorer(&self, base: &str, height: u64) -> Result<BlockInfo> {
        let base = base.trim_end_matches('/');

        let request =
            HttpRequest::get(format!("{base}/block-height/{height}")).timeout(self.timeout);
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(ClientError::InvalidBlockData(format!(
                "status {} for height {height}",
                response.status
            )));
        }
        let block_hash = response.text().trim().to_string();
        if block_hash.len() != 64 || !block_hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ClientError::InvalidBlockData(format!(
                "malformed block hash {block_hash:?}"
            )));
        }

        let request = HttpRequest::get(format!("{base}/block/{block_hash}")).timeout(self.timeout);
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            return Err(ClientError::InvalidBlockData(format!(
                "status {} for block {block_hash}",
                response.status
            )));
        }
        let block: EsploraBlock = serde_json::from_slice(&response.body)
            .map_err(|e| ClientError::InvalidBlockData(e.to_string()))?;

        Ok(BlockInfo {
            height,
            block_hash,
            merkle_root: block.merkle_root,
            timestamp: block.timestamp,
        })
    }
}

#[async_trait]
impl BlockSource for EsploraBlockSource {
    async fn block_at_height(&self, height: u64) -> Result<BlockInfo> {
        let mut errors = Vec::new();
        for base in &self.explorers {
            match self.try_explorer(base, height).await {
                Ok(info) => {
                    debug!(height, explorer = %base, "block lookup succeeded");
                    return Ok(info);
                }
                Err(e) => {
                    warn!(height, explorer = %base, error = %e, "block lookup failed");
                    errors.push(format!("{base}: {e}"));
                }
            }
        }
        Err(ClientError::ExplorerFailed { errors })
    }
}
