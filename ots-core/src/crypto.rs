//! Hash algorithms and constant-time comparison.
//!
//! The four algorithms the OTS wire format recognizes, with their wire
//! tags and digest lengths. Keccak-256 is parseable for compatibility
//! but rejected at execution time.

use std::fmt;

use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

/// Hash algorithms recognized by the OTS format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA-256 (32-byte digest).
    Sha256,
    /// SHA-1 (20-byte digest).
    Sha1,
    /// RIPEMD-160 (20-byte digest).
    Ripemd160,
    /// Keccak-256 (32-byte digest). Recognized, never executed.
    Keccak256,
}

impl HashAlgorithm {
    /// Wire tag byte.
    pub fn tag(self) -> u8 {
        match self {
            Self::Sha256 => 0x08,
            Self::Sha1 => 0x02,
            Self::Ripemd160 => 0x03,
            Self::Keccak256 => 0x67,
        }
    }

    /// Digest length in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            Self::Sha256 | Self::Keccak256 => 32,
            Self::Sha1 | Self::Ripemd160 => 20,
        }
    }

    /// Match a wire tag byte against the known algorithms.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0x08 => Ok(Self::Sha256),
            0x02 => Ok(Self::Sha1),
            0x03 => Ok(Self::Ripemd160),
            0x67 => Ok(Self::Keccak256),
            other => Err(Error::UnknownHashTag(other)),
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
            Self::Sha1 => "SHA1",
            Self::Ripemd160 => "RIPEMD160",
            Self::Keccak256 => "KECCAK256",
        }
    }

    /// Compute the digest of `data`.
    ///
    /// Keccak-256 fails with [`Error::UnsupportedOp`].
    pub fn digest(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Sha256 => Ok(Sha256::digest(data).to_vec()),
            Self::Sha1 => Ok(Sha1::digest(data).to_vec()),
            Self::Ripemd160 => Ok(Ripemd160::digest(data).to_vec()),
            Self::Keccak256 => Err(Error::UnsupportedOp("keccak256")),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compare two byte strings in constant time.
///
/// Length mismatch returns false immediately; at equal lengths every
/// byte position is examined. Used for the file digest, merkle roots,
/// and the magic header.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
