//! OpenTimestamps proof trees: binary codec, replay engine, formatter.
//!
//! This crate is the pure data plane of the OpenTimestamps client:
//! - The `.ots` binary grammar (parser and canonical writer)
//! - The recursive proof tree (operations, attestations, timestamps)
//! - The operation replay engine (append/prepend/hash/reverse/hexlify)
//! - A text formatter rendering proofs as indented tree diagrams
//!
//! No I/O happens here. Stamping, upgrading, and verification against
//! calendar servers and block explorers live in the client crate.
//!
//! # Example
//!
//! ```ignore
//! use ots_core::{render, OtsFile};
//!
//! let bytes = std::fs::read("proof.ots")?;
//! let file = OtsFile::from_bytes(&bytes)?;
//! println!("{}", render(&file));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod attestation;
pub mod crypto;
pub mod de;
pub mod error;
pub mod format;
pub mod op;
pub mod ser;
pub mod timestamp;

#[cfg(test)]
mod proptest;

pub use attestation::Attestation;
pub use crypto::{constant_time_eq, HashAlgorithm};
pub use de::{Limits, MAGIC, VERSION};
pub use error::{Error, Result};
pub use format::render;
pub use op::Operation;
pub use timestamp::{OtsFile, Timestamp};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::attestation::Attestation;
    pub use crate::crypto::HashAlgorithm;
    pub use crate::de::Limits;
    pub use crate::error::{Error, Result};
    pub use crate::op::Operation;
    pub use crate::timestamp::{OtsFile, Timestamp};
}
