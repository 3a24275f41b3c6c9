//! OpenTimestamps client: stamp, upgrade, and verify proofs.
//!
//! Drives the full lifecycle of a single proof artifact:
//! - **stamp** submits a blinded digest to calendar servers and
//!   assembles a pending proof
//! - **upgrade** replaces pending leaves with the completed sub-trees
//!   once Bitcoin has confirmed
//! - **verify** replays the proof chain and compares the result against
//!   a real Bitcoin block header
//!
//! All network I/O goes through two collaborator traits,
//! [`HttpTransport`] and [`BlockSource`], so tests inject deterministic
//! responses.
//!
//! # Example
//!
//! ```ignore
//! use ots_client::{ClientConfig, OtsClient};
//!
//! let client = OtsClient::new(ClientConfig::default())?;
//! let proof = client.stamp(b"document contents").await?;
//! std::fs::write("document.ots", proof.to_bytes())?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod calendar;
pub mod client;
pub mod config;
pub mod errors;
pub mod explorer;
pub mod http;
mod stamp;
pub mod upgrade;
pub mod verify;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use calendar::CalendarClient;
pub use client::OtsClient;
pub use config::ClientConfig;
pub use errors::{ClientError, Result};
pub use explorer::{BlockInfo, BlockSource, EsploraBlockSource};
pub use http::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
pub use upgrade::UpgradeReport;
pub use verify::VerifyOutcome;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockBlockSource, MockTransport};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::OtsClient;
    pub use crate::config::ClientConfig;
    pub use crate::errors::{ClientError, Result};
    pub use crate::explorer::{BlockInfo, BlockSource};
    pub use crate::http::HttpTransport;
    pub use crate::upgrade::UpgradeReport;
    pub use crate::verify::VerifyOutcome;
    pub use ots_core::prelude::*;
}
