//! Error types for the OTS client.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced at the client API boundary.
///
/// Per-attestation outcomes during verification are never errors; they
/// come back as [`crate::verify::VerifyOutcome`] entries. Upgrade
/// failures accumulate in the report. Only fatal conditions land here.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed `.ots` data.
    #[error("format error: {0}")]
    Format(#[from] ots_core::Error),

    /// Supplied data does not match the proof's file digest.
    #[error("digest mismatch: proof commits to {expected}, got {got}")]
    DigestMismatch {
        /// Digest the proof commits to, hex-encoded.
        expected: String,
        /// Digest of the supplied data, hex-encoded.
        got: String,
    },

    /// Every calendar server failed during stamping.
    #[error("no calendar server responded: {}", .errors.join("; "))]
    NoCalendarResponse {
        /// One message per failed server.
        errors: Vec<String>,
    },

    /// HTTP transport failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Calendar server returned an unexpected status.
    #[error("calendar {server} returned status {status}")]
    CalendarStatus {
        /// Server base URL.
        server: String,
        /// HTTP status code.
        status: u16,
    },

    /// Calendar returned an empty body where a timestamp was expected.
    #[error("calendar {server} returned an empty response")]
    EmptyCalendarResponse {
        /// Server base URL.
        server: String,
    },

    /// Response body exceeded the configured cap.
    #[error("response too large: {len} bytes (max {max})")]
    ResponseTooLarge {
        /// Body length received.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Every configured block explorer failed.
    #[error("all block explorers failed: {}", .errors.join("; "))]
    ExplorerFailed {
        /// One message per failed explorer.
        errors: Vec<String>,
    },

    /// Block explorer returned malformed data.
    #[error("invalid block data: {0}")]
    InvalidBlockData(String),
}
