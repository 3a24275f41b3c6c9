//! Proof-tree attestations.
//!
//! An attestation is the terminal of a proof path: a claim that the
//! message at that point equals something provable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bitcoin attestation tag.
pub(crate) const BITCOIN_TAG: [u8; 8] = [0x05, 0x88, 0x96, 0x0d, 0x73, 0xd7, 0x19, 0x01];
/// Litecoin attestation tag.
pub(crate) const LITECOIN_TAG: [u8; 8] = [0x06, 0x86, 0x9a, 0x0d, 0x73, 0xd7, 0x1b, 0x45];
/// Ethereum attestation tag.
pub(crate) const ETHEREUM_TAG: [u8; 8] = [0x30, 0xfe, 0x80, 0x87, 0xb5, 0xc7, 0xea, 0xd7];
/// Pending (calendar) attestation tag.
pub(crate) const PENDING_TAG: [u8; 8] = [0x83, 0xdf, 0xe3, 0x0d, 0x2e, 0xf9, 0x0c, 0x8e];

/// Terminal claim at the end of a proof path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attestation {
    /// Anchored in the Bitcoin block at this height.
    Bitcoin {
        /// Block height.
        height: u64,
    },
    /// Anchored in a Litecoin block. Recognized, never verified.
    Litecoin {
        /// Block height.
        height: u64,
    },
    /// Anchored in an Ethereum block. Recognized, never verified.
    Ethereum {
        /// Block height.
        height: u64,
    },
    /// Awaiting confirmation by a calendar server.
    Pending {
        /// Calendar base URL to upgrade from later.
        uri: String,
    },
    /// Unrecognized attestation, preserved verbatim for roundtrip.
    Unknown {
        /// The 8-byte wire tag.
        tag: [u8; 8],
        /// Raw payload bytes.
        payload: Vec<u8>,
    },
}

impl Attestation {
    /// The 8-byte wire tag for this attestation.
    pub fn tag(&self) -> &[u8; 8] {
        match self {
            Self::Bitcoin { .. } => &BITCOIN_TAG,
            Self::Litecoin { .. } => &LITECOIN_TAG,
            Self::Ethereum { .. } => &ETHEREUM_TAG,
            Self::Pending { .. } => &PENDING_TAG,
            Self::Unknown { tag, .. } => tag,
        }
    }

    /// Whether this attestation still awaits calendar confirmation.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

impl fmt::Display for Attestation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitcoin { height } => write!(f, "Bitcoin block #{height}"),
            Self::Litecoin { height } => write!(f, "Litecoin block #{height}"),
            Self::Ethereum { height } => write!(f, "Ethereum block #{height}"),
            Self::Pending { uri } => write!(f, "Pending ({uri})"),
            Self::Unknown { tag, .. } => {
                write!(f, "Unknown attestation ({})", hex::encode(tag))
            }
        }
    }
}
