//! Binary `.ots` writer.
//!
//! The writer is canonical: integers use the minimum number of LEB128
//! bytes, attestations come before continuations at every node, and a
//! node with k branches is emitted as (k-1) fork markers interleaving
//! the k branch bodies.

use crate::attestation::Attestation;
use crate::de::{ATTESTATION_MARKER, FORK_MARKER, MAGIC, VERSION};
use crate::op::Operation;
use crate::timestamp::{OtsFile, Timestamp};

/// Write an unsigned LEB128 varuint using the minimum number of bytes.
pub fn write_varuint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Write a length-prefixed byte string.
pub fn write_varbytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_varuint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

impl OtsFile {
    /// Serialize to canonical `.ots` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.file_digest.len());
        out.extend_from_slice(&MAGIC);
        write_varuint(&mut out, VERSION);
        out.push(self.hash_op.tag());
        out.extend_from_slice(&self.file_digest);
        self.timestamp.write_into(&mut out);
        out
    }
}

impl Timestamp {
    /// Serialize this node and its subtree as standalone bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_into(&mut out);
        out
    }

    /// Serialize this node and its subtree into `out`.
    pub fn write_into(&self, out: &mut Vec<u8>) {
        let total = self.branch_count();
        let mut index = 0;
        for att in &self.attestations {
            index += 1;
            if index < total {
                out.push(FORK_MARKER);
            }
            write_attestation(out, att);
        }
        for (op, child) in &self.ops {
            index += 1;
            if index < total {
                out.push(FORK_MARKER);
            }
            write_operation(out, op);
            child.write_into(out);
        }
    }
}

fn write_attestation(out: &mut Vec<u8>, att: &Attestation) {
    out.push(ATTESTATION_MARKER);
    out.extend_from_slice(att.tag());
    let mut payload = Vec::new();
    match att {
        Attestation::Bitcoin { height }
        | Attestation::Litecoin { height }
        | Attestation::Ethereum { height } => write_varuint(&mut payload, *height),
        Attestation::Pending { uri } => write_varbytes(&mut payload, uri.as_bytes()),
        Attestation::Unknown { payload: raw, .. } => payload.extend_from_slice(raw),
    }
    write_varbytes(out, &payload);
}

fn write_operation(out: &mut Vec<u8>, op: &Operation) {
    out.push(op.tag());
    match op {
        Operation::Append(data) | Operation::Prepend(data) => write_varbytes(out, data),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::HashAlgorithm;

    #[test]
    fn test_varuint_minimal_encodings() {
        let mut out = Vec::new();
        write_varuint(&mut out, 0);
        assert_eq!(out, vec![0x00]);

        out.clear();
        write_varuint(&mut out, 128);
        assert_eq!(out, vec![0x80, 0x01]);

        out.clear();
        write_varuint(&mut out, 300);
        assert_eq!(out, vec![0xac, 0x02]);
    }

    #[test]
    fn test_output_starts_with_magic() {
        let file = OtsFile {
            hash_op: HashAlgorithm::Sha256,
            file_digest: vec![0u8; 32],
            timestamp: Timestamp {
                attestations: vec![Attestation::Bitcoin { height: 1 }],
                ops: vec![],
            },
        };
        assert!(file.to_bytes().starts_with(&MAGIC));
    }

    #[test]
    fn test_fork_marker_shape() {
        // Three branches encode as: 0xff B1 0xff B2 B3.
        let node = Timestamp {
            attestations: vec![
                Attestation::Bitcoin { height: 1 },
                Attestation::Bitcoin { height: 2 },
                Attestation::Bitcoin { height: 3 },
            ],
            ops: vec![],
        };
        let bytes = node.to_bytes();
        let markers = bytes.iter().filter(|b| **b == 0xff).count();
        assert_eq!(markers, 2);
        assert_eq!(bytes[0], 0xff);
        assert_ne!(*bytes.last().unwrap(), 0xff);
    }

    #[test]
    fn test_attestations_before_continuations() {
        let node = Timestamp {
            attestations: vec![Attestation::Bitcoin { height: 1 }],
            ops: vec![(
                Operation::Reverse,
                Timestamp {
                    attestations: vec![Attestation::Bitcoin { height: 2 }],
                    ops: vec![],
                },
            )],
        };
        let bytes = node.to_bytes();
        // Fork marker, then the attestation branch, then the operation.
        assert_eq!(bytes[0], 0xff);
        assert_eq!(bytes[1], 0x00);
    }

    #[test]
    fn test_roundtrip_canonical_bytes() {
        let node = Timestamp {
            attestations: vec![Attestation::Pending {
                uri: "https://alice.btc.calendar.opentimestamps.org".into(),
            }],
            ops: vec![(
                Operation::Append(vec![0xde, 0xad]),
                Timestamp {
                    attestations: vec![Attestation::Bitcoin { height: 358391 }],
                    ops: vec![],
                },
            )],
        };
        let bytes = node.to_bytes();
        let reparsed = Timestamp::from_bytes(&bytes).unwrap();
        assert_eq!(reparsed, node);
        assert_eq!(reparsed.to_bytes(), bytes);
    }

    #[test]
    fn test_unknown_attestation_byte_exact_roundtrip() {
        let node = Timestamp {
            attestations: vec![Attestation::Unknown {
                tag: [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x01, 0x02, 0x03],
                payload: vec![0x01, 0x80, 0x00],
            }],
            ops: vec![],
        };
        let bytes = node.to_bytes();
        let reparsed = Timestamp::from_bytes(&bytes).unwrap();
        assert_eq!(reparsed, node);
        assert_eq!(reparsed.to_bytes(), bytes);
    }
}
