//! Upgrading: replace pending attestations with completed sub-trees.
//!
//! For every pending leaf the walker asks the calendar for the
//! commitment built up along the path. A completed answer replaces the
//! leaf with the contents of the returned sub-tree; a 404 keeps the
//! leaf for a later attempt; any other failure keeps the leaf and
//! records the error. The tree is mutated in place.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ots_core::{Attestation, Limits, OtsFile, Timestamp};

use crate::calendar::CalendarClient;
use crate::errors::Result;

/// Outcome of an upgrade pass. Counts, not a new tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeReport {
    /// Pending attestations replaced with completed sub-trees.
    pub upgraded: usize,
    /// Pending attestations the calendar still reports as pending.
    pub still_pending: usize,
    /// Per-attestation failures; the pending leaf is retained.
    pub errors: Vec<String>,
    /// True when the tree had nothing pending to begin with.
    pub already_complete: bool,
}

pub(crate) async fn upgrade_file(
    calendar: &CalendarClient,
    limits: &Limits,
    file: &mut OtsFile,
) -> Result<UpgradeReport> {
    if !file.timestamp.has_pending() {
        debug!("proof already complete, skipping upgrade walk");
        return Ok(UpgradeReport {
            already_complete: true,
            ..Default::default()
        });
    }

    let mut report = UpgradeReport::default();
    let msg = file.file_digest.clone();
    upgrade_node(calendar, limits, &mut file.timestamp, msg, 0, &mut report).await?;
    info!(
        upgraded = report.upgraded,
        still_pending = report.still_pending,
        errors = report.errors.len(),
        "upgrade pass complete"
    );
    Ok(report)
}

fn upgrade_node<'a>(
    calendar: &'a CalendarClient,
    limits: &'a Limits,
    node: &'a mut Timestamp,
    msg: Vec<u8>,
    depth: usize,
    report: &'a mut UpgradeReport,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        if depth > limits.max_depth {
            report
                .errors
                .push(format!("proof tree deeper than {} levels", limits.max_depth));
            return Ok(());
        }

        // Snapshot the continuation count before any structural change:
        // continuations appended by an upgrade below come straight from
        // the calendar and must not be walked again.
        let original_ops = node.ops.len();

        let attestations = std::mem::take(&mut node.attestations);
        let mut kept = Vec::with_capacity(attestations.len());
        for att in attestations {
            let uri = match att {
                Attestation::Pending { uri } => uri,
                other => {
                    kept.push(other);
                    continue;
                }
            };
            match calendar.lookup(&uri, &msg).await {
                Ok(Some(body)) => match Timestamp::from_bytes_with(&body, limits) {
                    Ok(subtree) => {
                        debug!(%uri, "pending attestation upgraded");
                        report.upgraded += 1;
                        kept.extend(subtree.attestations);
                        node.ops.extend(subtree.ops);
                    }
                    Err(e) => {
                        report.errors.push(format!("{uri}: {e}"));
                        kept.push(Attestation::Pending { uri });
                    }
                },
                Ok(None) => {
                    report.still_pending += 1;
                    kept.push(Attestation::Pending { uri });
                }
                Err(e) => {
                    report.errors.push(format!("{uri}: {e}"));
                    kept.push(Attestation::Pending { uri });
                }
            }
        }
        node.attestations = kept;

        for index in 0..original_ops {
            let child_msg = match node.ops[index].0.apply(&msg) {
                Ok(m) => m,
                Err(e) => {
                    report.errors.push(e.to_string());
                    continue;
                }
            };
            let child = &mut node.ops[index].1;
            upgrade_node(calendar, limits, child, child_msg, depth + 1, report).await?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ots_core::{HashAlgorithm, Operation};

    use crate::config::ClientConfig;
    use crate::http::Method;
    use crate::mock::MockTransport;

    const ALICE: &str = "https://alice.btc.calendar.opentimestamps.org";

    /// A pending proof shaped like a fresh stamp: the pending leaf sits
    /// below prepend(nonce) -> SHA256.
    fn pending_file() -> OtsFile {
        let leaf = Timestamp {
            attestations: vec![Attestation::Pending { uri: ALICE.into() }],
            ops: vec![],
        };
        let hashed = Timestamp {
            attestations: vec![],
            ops: vec![(Operation::Sha256, leaf)],
        };
        OtsFile {
            hash_op: HashAlgorithm::Sha256,
            file_digest: vec![0x42; 32],
            timestamp: Timestamp {
                attestations: vec![],
                ops: vec![(Operation::Prepend(vec![0xaa; 16]), hashed)],
            },
        }
    }

    fn calendar(transport: Arc<MockTransport>) -> CalendarClient {
        CalendarClient::new(transport, ClientConfig::default())
    }

    async fn run_upgrade(
        calendar: &CalendarClient,
        file: &mut OtsFile,
    ) -> Result<UpgradeReport> {
        upgrade_file(calendar, &Limits::default(), file).await
    }

    #[tokio::test]
    async fn test_upgrade_replaces_pending_leaf() {
        let transport = Arc::new(MockTransport::new());
        let completed = Timestamp {
            attestations: vec![Attestation::Bitcoin { height: 500000 }],
            ops: vec![],
        };
        transport.reply(Method::Get, ALICE, 200, completed.to_bytes());

        let mut file = pending_file();
        let report = run_upgrade(&calendar(transport), &mut file).await.unwrap();

        assert_eq!(report.upgraded, 1);
        assert_eq!(report.still_pending, 0);
        assert!(report.errors.is_empty());
        assert!(!report.already_complete);
        assert!(!file.timestamp.has_pending());
        assert!(file
            .timestamp
            .all_attestations()
            .contains(&&Attestation::Bitcoin { height: 500000 }));
    }

    #[tokio::test]
    async fn test_upgrade_404_keeps_pending() {
        let transport = Arc::new(MockTransport::new());
        transport.reply(Method::Get, ALICE, 404, vec![]);

        let mut file = pending_file();
        let before = file.clone();
        let report = run_upgrade(&calendar(transport), &mut file).await.unwrap();

        assert_eq!(report.upgraded, 0);
        assert_eq!(report.still_pending, 1);
        assert_eq!(file, before);
    }

    #[tokio::test]
    async fn test_upgrade_transport_error_recorded() {
        let transport = Arc::new(MockTransport::new());
        transport.fail(Method::Get, ALICE, "connection reset");

        let mut file = pending_file();
        let report = run_upgrade(&calendar(transport), &mut file).await.unwrap();

        assert_eq!(report.upgraded, 0);
        assert_eq!(report.errors.len(), 1);
        assert!(file.timestamp.has_pending());
    }

    #[tokio::test]
    async fn test_already_complete_short_circuits() {
        let transport = Arc::new(MockTransport::new());
        let mut file = OtsFile {
            hash_op: HashAlgorithm::Sha256,
            file_digest: vec![0u8; 32],
            timestamp: Timestamp {
                attestations: vec![Attestation::Bitcoin { height: 358391 }],
                ops: vec![],
            },
        };
        let before = file.clone();
        let report = run_upgrade(&calendar(transport.clone()), &mut file)
            .await
            .unwrap();

        assert!(report.already_complete);
        assert_eq!(file, before);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_upgrade_does_not_walk_spliced_continuations() {
        // The calendar answer itself contains a continuation ending in
        // a pending attestation. The walker must splice it in without
        // recursing into it, so exactly one lookup happens.
        let transport = Arc::new(MockTransport::new());
        let completed = Timestamp {
            attestations: vec![Attestation::Bitcoin { height: 500000 }],
            ops: vec![(
                Operation::Reverse,
                Timestamp {
                    attestations: vec![Attestation::Pending { uri: ALICE.into() }],
                    ops: vec![],
                },
            )],
        };
        transport.reply(Method::Get, ALICE, 200, completed.to_bytes());

        let mut file = pending_file();
        let report = run_upgrade(&calendar(transport.clone()), &mut file)
            .await
            .unwrap();

        assert_eq!(report.upgraded, 1);
        assert_eq!(transport.requests().len(), 1);
        // The spliced pending leaf survives untouched for a later pass.
        assert!(file.timestamp.has_pending());
    }

    #[tokio::test]
    async fn test_upgrade_commitment_matches_path() {
        // The lookup must use the message at the pending node, not the
        // file digest.
        let transport = Arc::new(MockTransport::new());
        transport.reply(Method::Get, ALICE, 404, vec![]);

        let mut file = pending_file();
        run_upgrade(&calendar(transport.clone()), &mut file)
            .await
            .unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&[0xaa; 16]);
        expected.extend_from_slice(&[0x42; 32]);
        let commitment = HashAlgorithm::Sha256.digest(&expected).unwrap();
        let requests = transport.requests();
        assert_eq!(
            requests[0].url,
            format!("{ALICE}/timestamp/{}", hex::encode(commitment))
        );
    }
}
