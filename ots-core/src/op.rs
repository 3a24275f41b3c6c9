//! Proof-path operations and the replay engine.
//!
//! An operation transforms the evolving message threaded down a proof
//! path. Applying one is pure: the input is never mutated and the
//! output is freshly allocated.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::HashAlgorithm;
use crate::error::Result;

pub(crate) const TAG_APPEND: u8 = 0xf0;
pub(crate) const TAG_PREPEND: u8 = 0xf1;
pub(crate) const TAG_REVERSE: u8 = 0xf2;
pub(crate) const TAG_HEXLIFY: u8 = 0xf3;

/// A single transformation along a proof path.
///
/// The four hash variants share their tag bytes with [`HashAlgorithm`];
/// the same tag means the same thing in both roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Concatenate the payload after the message.
    Append(Vec<u8>),
    /// Concatenate the payload before the message.
    Prepend(Vec<u8>),
    /// Reverse the message byte order.
    Reverse,
    /// Replace the message with its lowercase hex encoding (UTF-8).
    Hexlify,
    /// Replace the message with its SHA-256 digest.
    Sha256,
    /// Replace the message with its SHA-1 digest.
    Sha1,
    /// Replace the message with its RIPEMD-160 digest.
    Ripemd160,
    /// Keccak-256. Recognized on the wire, fails at execution time.
    Keccak256,
}

impl Operation {
    /// Wire tag byte.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Append(_) => TAG_APPEND,
            Self::Prepend(_) => TAG_PREPEND,
            Self::Reverse => TAG_REVERSE,
            Self::Hexlify => TAG_HEXLIFY,
            Self::Sha256 => HashAlgorithm::Sha256.tag(),
            Self::Sha1 => HashAlgorithm::Sha1.tag(),
            Self::Ripemd160 => HashAlgorithm::Ripemd160.tag(),
            Self::Keccak256 => HashAlgorithm::Keccak256.tag(),
        }
    }

    /// Apply this operation to a message, producing a new message.
    pub fn apply(&self, msg: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Append(data) => {
                let mut out = Vec::with_capacity(msg.len() + data.len());
                out.extend_from_slice(msg);
                out.extend_from_slice(data);
                Ok(out)
            }
            Self::Prepend(data) => {
                let mut out = Vec::with_capacity(msg.len() + data.len());
                out.extend_from_slice(data);
                out.extend_from_slice(msg);
                Ok(out)
            }
            Self::Reverse => {
                let mut out = msg.to_vec();
                out.reverse();
                Ok(out)
            }
            Self::Hexlify => Ok(hex::encode(msg).into_bytes()),
            Self::Sha256 => HashAlgorithm::Sha256.digest(msg),
            Self::Sha1 => HashAlgorithm::Sha1.digest(msg),
            Self::Ripemd160 => HashAlgorithm::Ripemd160.digest(msg),
            Self::Keccak256 => HashAlgorithm::Keccak256.digest(msg),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append(data) => write!(f, "append({})", hex::encode(data)),
            Self::Prepend(data) => write!(f, "prepend({})", hex::encode(data)),
            Self::Reverse => f.write_str("reverse"),
            Self::Hexlify => f.write_str("hexlify"),
            Self::Sha256 => f.write_str("SHA256"),
            Self::Sha1 => f.write_str("SHA1"),
            Self::Ripemd160 => f.write_str("RIPEMD160"),
            Self::Keccak256 => f.write_str("KECCAK256"),
        }
    }
}
