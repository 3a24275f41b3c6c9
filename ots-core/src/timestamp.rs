//! The recursive proof tree and the document root.

use serde::{Deserialize, Serialize};

use crate::attestation::Attestation;
use crate::crypto::HashAlgorithm;
use crate::error::{Error, Result};
use crate::op::Operation;

/// A node in the proof tree.
///
/// Holds the attestations claimed at this point in the proof plus the
/// continuations leading to child nodes. Attestation branches and
/// operation branches are parallel; the canonical writer emits
/// attestations first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    /// Attestations claimed at this node.
    pub attestations: Vec<Attestation>,
    /// Continuations: an operation and the subtree it leads to.
    pub ops: Vec<(Operation, Timestamp)>,
}

impl Timestamp {
    /// Create an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of branches (attestations plus continuations) at this node.
    pub fn branch_count(&self) -> usize {
        self.attestations.len() + self.ops.len()
    }

    /// Whether this node has no branches at all.
    pub fn is_empty(&self) -> bool {
        self.branch_count() == 0
    }

    /// Splice another node's branches into this one.
    ///
    /// Used when assembling a stamp from several calendar responses and
    /// when an upgrade replaces a pending leaf with the contents of the
    /// calendar's completed subtree.
    pub fn merge(&mut self, other: Timestamp) {
        self.attestations.extend(other.attestations);
        self.ops.extend(other.ops);
    }

    /// Whether any pending attestation is reachable from this node.
    pub fn has_pending(&self) -> bool {
        self.attestations.iter().any(Attestation::is_pending)
            || self.ops.iter().any(|(_, child)| child.has_pending())
    }

    /// All attestations reachable from this node, depth-first,
    /// attestations before continuations at each node.
    pub fn all_attestations(&self) -> Vec<&Attestation> {
        let mut out = Vec::new();
        self.collect_attestations(&mut out);
        out
    }

    fn collect_attestations<'a>(&'a self, out: &mut Vec<&'a Attestation>) {
        out.extend(self.attestations.iter());
        for (_, child) in &self.ops {
            child.collect_attestations(out);
        }
    }
}

/// A complete `.ots` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtsFile {
    /// Hash algorithm applied to the original file.
    pub hash_op: HashAlgorithm,
    /// Digest of the original file; length matches `hash_op`.
    pub file_digest: Vec<u8>,
    /// Root of the proof tree.
    pub timestamp: Timestamp,
}

impl OtsFile {
    /// Create a document root, validating the digest length.
    pub fn new(hash_op: HashAlgorithm, file_digest: Vec<u8>, timestamp: Timestamp) -> Result<Self> {
        if file_digest.len() != hash_op.digest_len() {
            return Err(Error::InvalidDigestLength {
                expected: hash_op.digest_len(),
                got: file_digest.len(),
            });
        }
        Ok(Self {
            hash_op,
            file_digest,
            timestamp,
        })
    }

    /// The file digest as lowercase hex.
    pub fn digest_hex(&self) -> String {
        hex::encode(&self.file_digest)
    }
}
