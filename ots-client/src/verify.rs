//! Verification: replay the proof chain and compare against Bitcoin.
//!
//! Walks the tree depth-first from the file digest, applying each
//! operation to the evolving message. Every attestation on every path
//! produces a result; nothing short-circuits. Only a digest mismatch
//! between supplied data and the proof is fatal.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ots_core::{constant_time_eq, Attestation, Limits, OtsFile, Timestamp};

use crate::errors::{ClientError, Result};
use crate::explorer::BlockSource;

/// Outcome of checking a single attestation path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyOutcome {
    /// The proof chain reduced to the block's merkle root.
    Verified {
        /// Bitcoin block height.
        height: u64,
        /// Block hash, big-endian hex.
        block_hash: String,
        /// Block timestamp, unix seconds.
        block_time: i64,
    },
    /// The proof chain did not match the block's merkle root.
    Failed {
        /// Bitcoin block height.
        height: u64,
        /// Expected merkle root bytes (little-endian), hex-encoded.
        expected: String,
        /// What the proof chain produced, hex-encoded.
        got: String,
    },
    /// Awaiting calendar confirmation.
    Pending {
        /// Calendar URI an upgrade would use.
        uri: String,
    },
    /// Recognized but not checked.
    Skipped {
        /// Why the attestation was skipped.
        reason: String,
    },
    /// Lookup or replay failure on this path.
    Error {
        /// Failure description.
        message: String,
    },
}

pub(crate) async fn verify_file(
    blocks: &dyn BlockSource,
    limits: &Limits,
    file: &OtsFile,
    digest: Option<&[u8]>,
) -> Result<Vec<VerifyOutcome>> {
    if let Some(digest) = digest {
        if !constant_time_eq(digest, &file.file_digest) {
            return Err(ClientError::DigestMismatch {
                expected: file.digest_hex(),
                got: hex::encode(digest),
            });
        }
    }
    let mut results = Vec::new();
    walk(
        blocks,
        limits,
        &file.timestamp,
        file.file_digest.clone(),
        0,
        &mut results,
    )
    .await;
    Ok(results)
}

fn walk<'a>(
    blocks: &'a dyn BlockSource,
    limits: &'a Limits,
    node: &'a Timestamp,
    msg: Vec<u8>,
    depth: usize,
    results: &'a mut Vec<VerifyOutcome>,
) -> BoxFuture<'a, ()> {
    Box::pin(async move {
        if depth > limits.max_depth {
            results.push(VerifyOutcome::Error {
                message: format!("proof tree deeper than {} levels", limits.max_depth),
            });
            return;
        }
        for att in &node.attestations {
            results.push(check_attestation(blocks, att, &msg).await);
        }
        for (op, child) in &node.ops {
            match op.apply(&msg) {
                Ok(child_msg) => walk(blocks, limits, child, child_msg, depth + 1, results).await,
                Err(e) => results.push(VerifyOutcome::Error {
                    message: e.to_string(),
                }),
            }
        }
    })
}

async fn check_attestation(
    blocks: &dyn BlockSource,
    att: &Attestation,
    msg: &[u8],
) -> VerifyOutcome {
    match att {
        Attestation::Bitcoin { height } => {
            let info = match blocks.block_at_height(*height).await {
                Ok(info) => info,
                Err(e) => {
                    return VerifyOutcome::Error {
                        message: e.to_string(),
                    }
                }
            };
            // Explorers display the merkle root big-endian; the proof
            // chain produces the little-endian byte form.
            let mut expected = match hex::decode(&info.merkle_root) {
                Ok(bytes) => bytes,
                Err(e) => {
                    return VerifyOutcome::Error {
                        message: format!("malformed merkle root for block {height}: {e}"),
                    }
                }
            };
            expected.reverse();
            if constant_time_eq(msg, &expected) {
                debug!(height, "bitcoin attestation verified");
                VerifyOutcome::Verified {
                    height: *height,
                    block_hash: info.block_hash,
                    block_time: info.timestamp,
                }
            } else {
                VerifyOutcome::Failed {
                    height: *height,
                    expected: hex::encode(&expected),
                    got: hex::encode(msg),
                }
            }
        }
        Attestation::Pending { uri } => VerifyOutcome::Pending { uri: uri.clone() },
        Attestation::Litecoin { height } => VerifyOutcome::Skipped {
            reason: format!("Litecoin block #{height} attestations are not verified"),
        },
        Attestation::Ethereum { height } => VerifyOutcome::Skipped {
            reason: format!("Ethereum block #{height} attestations are not verified"),
        },
        Attestation::Unknown { tag, .. } => VerifyOutcome::Skipped {
            reason: format!("unknown attestation ({})", hex::encode(tag)),
        },
    }
}
