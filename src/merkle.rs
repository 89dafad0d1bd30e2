//! Merkle tree over audit leaves.
//!
//! Leaves are SHA-256 response digests. The bottom level is padded with
//! [`padding_leaf`] up to the next power of two, and every internal node is
//! `SHA256(left || right)` over the raw 32-byte children. Levels are numbered from the
//! leaves (level 0) up to the root (level [`MerkleTree::levels`]).

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;
use tracing::debug_span;

use crate::config::DIGEST_SIZE_BYTES;
use crate::{AuditError, Result};

/// A 32-byte SHA-256 digest used for leaves and internal nodes.
///
/// Serializes as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest([u8; DIGEST_SIZE_BYTES]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE_BYTES] {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; DIGEST_SIZE_BYTES]> for Digest {
    fn from(bytes: [u8; DIGEST_SIZE_BYTES]) -> Self {
        Digest(bytes)
    }
}

impl FromStr for Digest {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        let mut bytes = [0u8; DIGEST_SIZE_BYTES];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| AuditError::Serialization(format!("invalid digest {s:?}: {e}")))?;
        Ok(Digest(bytes))
    }
}

impl TryFrom<String> for Digest {
    type Error = AuditError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_hex()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

/// Hashes two child nodes into their parent.
pub fn hash_node(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(left.0);
    hasher.update(right.0);
    Digest(hasher.finalize().into())
}

/// Sentinel used to fill the bottom level up to a power of two: `SHA256("")`.
pub fn padding_leaf() -> Digest {
    Digest(Sha256::digest(b"").into())
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A Merkle tree with layers stored from leaves (layer 0) to root.
///
/// - `layers[0]` contains the padded leaf level
/// - `layers[layers.len() - 1]` contains the root (single element)
pub struct MerkleTree {
    layers: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Builds a tree from an ordered, non-empty leaf sequence.
    ///
    /// # Errors
    ///
    /// Returns `EmptyData` if `leaves` is empty.
    pub fn build(leaves: &[Digest]) -> Result<Self> {
        if leaves.is_empty() {
            return Err(AuditError::EmptyData {
                operation: "MerkleTree::build".to_string(),
            });
        }

        let padded_len = leaves.len().next_power_of_two();
        let _span = debug_span!("build_tree", leaves = leaves.len(), padded_len).entered();

        let mut bottom = Vec::with_capacity(padded_len);
        bottom.extend_from_slice(leaves);
        bottom.resize(padded_len, padding_leaf());

        let mut layers = vec![bottom];
        loop {
            let current = match layers.last() {
                Some(layer) if layer.len() > 1 => layer,
                _ => break,
            };
            let next: Vec<Digest> = current
                .chunks_exact(2)
                .map(|pair| hash_node(&pair[0], &pair[1]))
                .collect();
            layers.push(next);
        }

        Ok(MerkleTree { layers })
    }

    /// Returns the root of the tree.
    pub fn root(&self) -> Digest {
        // `build` guarantees a final layer holding exactly one node.
        self.layers[self.layers.len() - 1][0]
    }

    /// Height of the tree: edges from a leaf to the root.
    pub fn levels(&self) -> usize {
        self.layers.len() - 1
    }

    /// Nodes at `depth`, counted up from the leaves.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfBounds` if `depth` is above the root.
    pub fn level(&self, depth: usize) -> Result<&[Digest]> {
        self.layers
            .get(depth)
            .map(Vec::as_slice)
            .ok_or(AuditError::IndexOutOfBounds {
                index: depth,
                length: self.layers.len(),
            })
    }

    /// The padded bottom level.
    pub fn leaves(&self) -> &[Digest] {
        &self.layers[0]
    }

    /// Number of leaves after padding.
    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }
}
