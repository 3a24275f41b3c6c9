//! Property-based tests for the codec.
//!
//! Tests the write/parse roundtrip and the varuint codec under
//! arbitrary inputs.

use proptest::prelude::*;

use crate::attestation::{
    Attestation, BITCOIN_TAG, ETHEREUM_TAG, LITECOIN_TAG, PENDING_TAG,
};
use crate::crypto::{constant_time_eq, HashAlgorithm};
use crate::de::MAGIC;
use crate::op::Operation;
use crate::ser::write_varuint;
use crate::timestamp::{OtsFile, Timestamp};

// ============================================================================
// Arbitrary Implementations
// ============================================================================

/// Heights and lengths must stay below the 2^53 varuint ceiling.
const SAFE_MAX: u64 = 1 << 53;

fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..24).prop_map(Operation::Append),
        prop::collection::vec(any::<u8>(), 0..24).prop_map(Operation::Prepend),
        Just(Operation::Reverse),
        Just(Operation::Hexlify),
        Just(Operation::Sha256),
        Just(Operation::Sha1),
        Just(Operation::Ripemd160),
        Just(Operation::Keccak256),
    ]
}

fn arb_attestation() -> impl Strategy<Value = Attestation> {
    prop_oneof![
        (0..SAFE_MAX).prop_map(|height| Attestation::Bitcoin { height }),
        (0..SAFE_MAX).prop_map(|height| Attestation::Litecoin { height }),
        (0..SAFE_MAX).prop_map(|height| Attestation::Ethereum { height }),
        "[a-z]{1,12}".prop_map(|host| Attestation::Pending {
            uri: format!("https://{host}.example.org"),
        }),
        (
            prop::array::uniform8(any::<u8>()),
            prop::collection::vec(any::<u8>(), 0..16),
        )
            .prop_filter("tag must not collide with a known attestation", |(tag, _)| {
                ![BITCOIN_TAG, LITECOIN_TAG, ETHEREUM_TAG, PENDING_TAG].contains(tag)
            })
            .prop_map(|(tag, payload)| Attestation::Unknown { tag, payload }),
    ]
}

/// Bounded trees: every node keeps at least one branch, the invariant
/// the parser enforces.
fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
    let leaf = prop::collection::vec(arb_attestation(), 1..3).prop_map(|attestations| Timestamp {
        attestations,
        ops: vec![],
    });
    leaf.prop_recursive(4, 24, 3, |inner| {
        (
            prop::collection::vec(arb_attestation(), 0..3),
            prop::collection::vec((arb_operation(), inner), 0..3),
        )
            .prop_filter("node needs at least one branch", |(atts, ops)| {
                !atts.is_empty() || !ops.is_empty()
            })
            .prop_map(|(attestations, ops)| Timestamp { attestations, ops })
    })
}

fn arb_file() -> impl Strategy<Value = OtsFile> {
    (prop::array::uniform32(any::<u8>()), arb_timestamp()).prop_map(|(digest, timestamp)| OtsFile {
        hash_op: HashAlgorithm::Sha256,
        file_digest: digest.to_vec(),
        timestamp,
    })
}

// ============================================================================
// Property Tests: Codec Roundtrip
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// write ∘ parse is the identity on varuints within the safe range.
    #[test]
    fn prop_varuint_roundtrip(value in 0..SAFE_MAX) {
        let mut bytes = Vec::new();
        write_varuint(&mut bytes, value);
        let reparsed = Timestamp::from_bytes(&varuint_probe(&bytes)).unwrap();
        prop_assert_eq!(
            reparsed.attestations,
            vec![Attestation::Bitcoin { height: value }]
        );
    }

    /// parse ∘ write is the identity on trees.
    #[test]
    fn prop_tree_roundtrip(file in arb_file()) {
        let bytes = file.to_bytes();
        let reparsed = OtsFile::from_bytes(&bytes).unwrap();
        prop_assert_eq!(reparsed, file);
    }

    /// Canonical output re-serializes byte-identically.
    #[test]
    fn prop_canonical_bytes_stable(file in arb_file()) {
        let bytes = file.to_bytes();
        let reparsed = OtsFile::from_bytes(&bytes).unwrap();
        prop_assert_eq!(reparsed.to_bytes(), bytes);
    }

    /// Writer output always begins with the magic header.
    #[test]
    fn prop_output_starts_with_magic(file in arb_file()) {
        prop_assert!(file.to_bytes().starts_with(&MAGIC));
    }

    /// Constant-time equality disagrees whenever any byte differs.
    #[test]
    fn prop_constant_time_eq(
        bytes in prop::collection::vec(any::<u8>(), 1..64),
        flip in any::<prop::sample::Index>(),
    ) {
        prop_assert!(constant_time_eq(&bytes, &bytes));
        let mut other = bytes.clone();
        let index = flip.index(other.len());
        other[index] ^= 0x01;
        prop_assert!(!constant_time_eq(&bytes, &other));
    }
}

/// Embed a varuint as a Bitcoin attestation payload so the roundtrip
/// exercises the real reader path.
fn varuint_probe(varuint: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.push(0x00);
    bytes.extend_from_slice(Attestation::Bitcoin { height: 0 }.tag());
    bytes.push(varuint.len() as u8);
    bytes.extend_from_slice(varuint);
    bytes
}
