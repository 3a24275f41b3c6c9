//! The high-level OTS client.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use ots_core::OtsFile;

use crate::calendar::CalendarClient;
use crate::config::ClientConfig;
use crate::errors::Result;
use crate::explorer::{BlockSource, EsploraBlockSource};
use crate::http::{HttpTransport, ReqwestTransport};
use crate::stamp;
use crate::upgrade::{self, UpgradeReport};
use crate::verify::{self, VerifyOutcome};

/// Client driving the full stamp / upgrade / verify lifecycle.
///
/// All network I/O goes through the injected [`HttpTransport`] and
/// [`BlockSource`]; [`OtsClient::new`] wires the production
/// implementations.
pub struct OtsClient {
    config: ClientConfig,
    calendar: CalendarClient,
    blocks: Arc<dyn BlockSource>,
}

impl OtsClient {
    /// Create a client with the production collaborators.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new()?);
        let blocks: Arc<dyn BlockSource> = Arc::new(EsploraBlockSource::new(
            transport.clone(),
            config.block_explorers.clone(),
            config.request_timeout,
        ));
        Ok(Self::with_collaborators(config, transport, blocks))
    }

    /// Create a client with injected collaborators.
    pub fn with_collaborators(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        blocks: Arc<dyn BlockSource>,
    ) -> Self {
        let calendar = CalendarClient::new(transport, config.clone());
        Self {
            config,
            calendar,
            blocks,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Stamp raw data, producing a pending proof.
    pub async fn stamp(&self, data: &[u8]) -> Result<OtsFile> {
        let digest: [u8; 32] = Sha256::digest(data).into();
        self.stamp_digest(digest).await
    }

    /// Stamp a pre-computed SHA-256 digest.
    pub async fn stamp_digest(&self, digest: [u8; 32]) -> Result<OtsFile> {
        stamp::stamp_digest(
            &self.calendar,
            &self.config.calendar_servers,
            &self.config.limits(),
            digest,
        )
        .await
    }

    /// Upgrade pending attestations in place.
    pub async fn upgrade(&self, file: &mut OtsFile) -> Result<UpgradeReport> {
        upgrade::upgrade_file(&self.calendar, &self.config.limits(), file).await
    }

    /// Verify a proof against the original data.
    ///
    /// The data is hashed with the proof's own algorithm and compared
    /// to the committed digest before any tree walk.
    pub async fn verify(&self, file: &OtsFile, data: &[u8]) -> Result<Vec<VerifyOutcome>> {
        let digest = file.hash_op.digest(data)?;
        verify::verify_file(
            self.blocks.as_ref(),
            &self.config.limits(),
            file,
            Some(&digest),
        )
        .await
    }

    /// Verify a proof against a pre-computed digest.
    pub async fn verify_digest(
        &self,
        file: &OtsFile,
        digest: &[u8],
    ) -> Result<Vec<VerifyOutcome>> {
        verify::verify_file(
            self.blocks.as_ref(),
            &self.config.limits(),
            file,
            Some(digest),
        )
        .await
    }

    /// Replay the proof without checking the file digest.
    pub async fn verify_proof(&self, file: &OtsFile) -> Result<Vec<VerifyOutcome>> {
        verify::verify_file(self.blocks.as_ref(), &self.config.limits(), file, None).await
    }
}
