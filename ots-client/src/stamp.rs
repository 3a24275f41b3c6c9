//! Stamping: submit a blinded digest to calendars and assemble a
//! pending proof.

use futures::future::join_all;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use ots_core::{HashAlgorithm, Limits, Operation, OtsFile, Timestamp};

use crate::calendar::CalendarClient;
use crate::errors::{ClientError, Result};

/// Length of the blinding nonce prepended before calendar submission.
pub const NONCE_LEN: usize = 16;

/// Stamp a pre-computed SHA-256 file digest.
///
/// The calendar never sees the file digest itself: a fresh random nonce
/// is prepended and the pair hashed again, and only that commitment is
/// submitted. Submissions fan out concurrently; the assembled proof
/// carries the responses in configured server order, skipping failures.
pub(crate) async fn stamp_digest(
    calendar: &CalendarClient,
    servers: &[String],
    limits: &Limits,
    file_digest: [u8; 32],
) -> Result<OtsFile> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let mut hasher = Sha256::new();
    hasher.update(nonce);
    hasher.update(file_digest);
    let calendar_digest: [u8; 32] = hasher.finalize().into();

    let submissions = servers.iter().map(|s| calendar.submit(s, &calendar_digest));
    let results = join_all(submissions).await;

    let mut leaf = Timestamp::new();
    let mut errors = Vec::new();
    let mut successes = 0usize;
    for (server, result) in servers.iter().zip(results) {
        let body = match result {
            Ok(body) => body,
            Err(e) => {
                warn!(%server, error = %e, "calendar submission failed");
                errors.push(format!("{server}: {e}"));
                continue;
            }
        };
        match Timestamp::from_bytes_with(&body, limits) {
            Ok(subtree) => {
                successes += 1;
                leaf.merge(subtree);
            }
            Err(e) => {
                warn!(%server, error = %e, "calendar returned a malformed timestamp");
                errors.push(format!("{server}: {e}"));
            }
        }
    }
    if successes == 0 {
        return Err(ClientError::NoCalendarResponse { errors });
    }
    info!(successes, failed = errors.len(), "stamp submitted");

    // The proof chain from the file digest to the calendar responses:
    // prepend the nonce, hash, then the merged server sub-trees.
    let hashed = Timestamp {
        attestations: vec![],
        ops: vec![(Operation::Sha256, leaf)],
    };
    let root = Timestamp {
        attestations: vec![],
        ops: vec![(Operation::Prepend(nonce.to_vec()), hashed)],
    };

    Ok(OtsFile {
        hash_op: HashAlgorithm::Sha256,
        file_digest: file_digest.to_vec(),
        timestamp: root,
    })
}
