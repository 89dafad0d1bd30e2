//! High-level assertion helpers for common test patterns.

#![allow(dead_code)]

use shard_audit::{AuditError, MerkleTree, PrivateRecord, PublicRecord, Result};
use std::fmt::Debug;

/// Asserts that the public record is exactly the bottom level of `tree`.
pub fn assert_public_matches_tree(public: &PublicRecord, tree: &MerkleTree) {
    let bottom = tree.level(0).expect("tree always has a leaf level");
    assert_eq!(public.leaves(), bottom, "public record must equal tree level 0");
    for leaf in public.leaves() {
        assert!(bottom.contains(leaf), "leaf {} missing from tree", leaf);
    }
}

/// Asserts that the private record reflects `tree`.
pub fn assert_private_matches_tree(private: &PrivateRecord, tree: &MerkleTree) {
    assert_eq!(private.root, tree.root());
    assert_eq!(private.root.to_hex(), private.root.to_hex().to_lowercase());
    assert_eq!(private.depth, tree.levels());
}

/// Asserts two sessions produced identical records.
pub fn assert_records_equal(
    (public_a, private_a): (&PublicRecord, &PrivateRecord),
    (public_b, private_b): (&PublicRecord, &PrivateRecord),
) {
    assert_eq!(public_a.len(), public_b.len());
    for (i, (a, b)) in public_a.leaves().iter().zip(public_b.leaves()).enumerate() {
        assert_eq!(a, b, "public leaf {} differs", i);
    }
    assert_eq!(private_a.root, private_b.root, "roots differ");
    assert_eq!(private_a.depth, private_b.depth, "depths differ");
    assert_eq!(private_a.challenges, private_b.challenges, "challenges differ");
}

/// Asserts that a result is a `Sequence` error mentioning `expected`.
pub fn assert_sequence_error<T: Debug>(result: Result<T>, expected: &str) {
    match result {
        Err(AuditError::Sequence { operation, reason }) => {
            let message = format!("{} {}", operation, reason);
            assert!(
                message.contains(expected),
                "Expected sequence error to contain '{}', but got: {}",
                expected,
                message
            );
        }
        other => panic!("Expected a Sequence error, got {:?}", other),
    }
}

/// Asserts that a result is an error whose message contains `expected`.
pub fn assert_error_contains<T: Debug>(result: Result<T>, expected: &str) {
    match result {
        Ok(value) => panic!("Expected an error, but got Ok({:?})", value),
        Err(error) => {
            let error_msg = format!("{}", error);
            assert!(
                error_msg.contains(expected),
                "Expected error message to contain '{}', but got: {}",
                expected,
                error_msg
            );
        }
    }
}
