//! Text rendering of proof trees.
//!
//! Renders a proof as an indented diagram with box-drawing glyphs, the
//! way command-line timestamp tools display them. Pure function, no
//! I/O.

use std::fmt::Write;

use crate::timestamp::{OtsFile, Timestamp};

/// Render a proof as an indented tree diagram.
///
/// The first line names the file digest and its algorithm; each branch
/// below prints an operation or an attestation, attestations first.
pub fn render(file: &OtsFile) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "File hash: {} ({})",
        file.digest_hex(),
        file.hash_op.name()
    );
    render_node(&file.timestamp, "", &mut out);
    out
}

fn render_node(node: &Timestamp, prefix: &str, out: &mut String) {
    let total = node.branch_count();
    let mut index = 0;
    for att in &node.attestations {
        index += 1;
        let connector = if index == total { "└── " } else { "├── " };
        let _ = writeln!(out, "{prefix}{connector}{att}");
    }
    for (op, child) in &node.ops {
        index += 1;
        let last = index == total;
        let connector = if last { "└── " } else { "├── " };
        let _ = writeln!(out, "{prefix}{connector}{op}");
        let child_prefix = if last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };
        render_node(child, &child_prefix, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attestation::Attestation;
    use crate::crypto::HashAlgorithm;
    use crate::op::Operation;

    #[test]
    fn test_render_single_attestation() {
        let file = OtsFile {
            hash_op: HashAlgorithm::Sha256,
            file_digest: vec![0xab; 32],
            timestamp: Timestamp {
                attestations: vec![Attestation::Bitcoin { height: 358391 }],
                ops: vec![],
            },
        };
        let text = render(&file);
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            format!("File hash: {} (SHA256)", "ab".repeat(32))
        );
        assert_eq!(lines.next().unwrap(), "└── Bitcoin block #358391");
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_render_nested_tree() {
        let leaf = Timestamp {
            attestations: vec![Attestation::Pending {
                uri: "https://alice.btc.calendar.opentimestamps.org".into(),
            }],
            ops: vec![],
        };
        let file = OtsFile {
            hash_op: HashAlgorithm::Sha256,
            file_digest: vec![0u8; 32],
            timestamp: Timestamp {
                attestations: vec![Attestation::Bitcoin { height: 1 }],
                ops: vec![(
                    Operation::Prepend(vec![0x6e]),
                    Timestamp {
                        attestations: vec![],
                        ops: vec![(Operation::Sha256, leaf)],
                    },
                )],
            },
        };
        let text = render(&file);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "├── Bitcoin block #1");
        assert_eq!(lines[2], "└── prepend(6e)");
        assert_eq!(lines[3], "    └── SHA256");
        assert_eq!(
            lines[4],
            "        └── Pending (https://alice.btc.calendar.opentimestamps.org)"
        );
    }

    #[test]
    fn test_render_sibling_column() {
        // A non-last continuation draws the │ column for its subtree.
        let file = OtsFile {
            hash_op: HashAlgorithm::Sha1,
            file_digest: vec![0u8; 20],
            timestamp: Timestamp {
                attestations: vec![],
                ops: vec![
                    (
                        Operation::Reverse,
                        Timestamp {
                            attestations: vec![Attestation::Bitcoin { height: 2 }],
                            ops: vec![],
                        },
                    ),
                    (
                        Operation::Hexlify,
                        Timestamp {
                            attestations: vec![Attestation::Bitcoin { height: 3 }],
                            ops: vec![],
                        },
                    ),
                ],
            },
        };
        let text = render(&file);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "├── reverse");
        assert_eq!(lines[2], "│   └── Bitcoin block #2");
        assert_eq!(lines[3], "└── hexlify");
        assert_eq!(lines[4], "    └── Bitcoin block #3");
    }
}
