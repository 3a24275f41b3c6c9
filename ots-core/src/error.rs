//! Error types for the OTS core.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the codec and the operation engine.
///
/// All codec errors are fatal to the operation in hand; the walkers in
/// the client crate convert per-path failures into in-band results
/// instead of surfacing these directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Input does not start with the OpenTimestamps magic bytes.
    #[error("bad magic: not an OpenTimestamps proof")]
    BadMagic,

    /// Unsupported format version.
    #[error("unsupported version {0} (only version 1 is supported)")]
    UnsupportedVersion(u64),

    /// Unknown hash algorithm tag byte.
    #[error("unknown hash algorithm tag {0:#04x}")]
    UnknownHashTag(u8),

    /// Unknown operation tag byte.
    #[error("unknown operation tag {0:#04x}")]
    UnknownOpTag(u8),

    /// Input ended before a complete structure was read.
    #[error("unexpected end of data")]
    UnexpectedEof,

    /// Varuint exceeds the safe integer range.
    #[error("varuint overflow")]
    VaruintOverflow,

    /// Varbytes length exceeds the configured cap.
    #[error("varbytes too large: {len} bytes (max {max})")]
    VarbytesTooLarge {
        /// Declared length.
        len: u64,
        /// Configured maximum.
        max: u64,
    },

    /// Recursion deeper than the configured cap.
    #[error("proof tree deeper than {max} levels")]
    DepthExceeded {
        /// Configured maximum depth.
        max: usize,
    },

    /// Bytes left over after a complete parse.
    #[error("trailing bytes after complete structure")]
    TrailingBytes,

    /// Pending attestation URI is not valid UTF-8.
    #[error("pending attestation URI is not valid UTF-8")]
    InvalidUri,

    /// Digest length does not match the hash algorithm.
    #[error("invalid digest length: expected {expected}, got {got}")]
    InvalidDigestLength {
        /// Length the hash algorithm produces.
        expected: usize,
        /// Length supplied.
        got: usize,
    },

    /// Operation is recognized on the wire but cannot be executed.
    #[error("unsupported operation: {0}")]
    UnsupportedOp(&'static str),
}
