//! Audit records handed across the crate boundary.
//!
//! - [`PublicRecord`]: the padded bottom level of the audit tree, shared with the holder
//! - [`PrivateRecord`]: root, depth and challenges, kept by the verifier
//!
//! Both are plain serde values. A versioned binary envelope is provided for callers that
//! want a stable byte format; JSON helpers cover the human-readable case.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::challenge::Challenge;
use crate::config::{MAX_RECORD_SIZE_BYTES, RECORD_FORMAT_VERSION};
use crate::merkle::{Digest, MerkleTree};
use crate::{AuditError, Result};

/// Constants for record serialization format
mod record_format {
    /// Magic bytes identifying a serialized public record
    pub const PUBLIC_MAGIC: &[u8; 4] = b"SAPU";

    /// Magic bytes identifying a serialized private record
    pub const PRIVATE_MAGIC: &[u8; 4] = b"SAPR";

    /// Header size in bytes: magic(4) + version(2) + length(4)
    pub const HEADER_SIZE: usize = 10;
}

/// Leaves of the audit tree, in challenge order followed by padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicRecord {
    leaves: Vec<Digest>,
}

impl PublicRecord {
    pub fn new(leaves: Vec<Digest>) -> Self {
        Self { leaves }
    }

    pub fn leaves(&self) -> &[Digest] {
        &self.leaves
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Leaves as lowercase hex strings.
    pub fn to_hex(&self) -> Vec<String> {
        self.leaves.iter().map(Digest::to_hex).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        to_json(self)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        from_json(json)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode_envelope(record_format::PUBLIC_MAGIC, self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_envelope(record_format::PUBLIC_MAGIC, bytes)
    }
}

/// The verifier's secret half of an audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateRecord {
    /// Root of the audit tree
    pub root: Digest,
    /// Height of the audit tree above its leaves
    pub depth: usize,
    /// Challenges in leaf order, shared with the session that produced them
    pub challenges: Arc<[Challenge]>,
}

impl PrivateRecord {
    /// Checks that `public` hashes up to this record's root and depth, returning the
    /// rebuilt tree.
    ///
    /// # Errors
    ///
    /// Returns `RecordMismatch` naming the first field that disagrees.
    pub fn check_public(&self, public: &PublicRecord) -> Result<MerkleTree> {
        if self.challenges.is_empty() {
            return Err(AuditError::RecordMismatch {
                field: "challenges".to_string(),
            });
        }
        if public.len() != self.challenges.len().next_power_of_two() {
            return Err(AuditError::RecordMismatch {
                field: "leaf count".to_string(),
            });
        }

        let tree = MerkleTree::build(public.leaves())?;
        if tree.levels() != self.depth {
            return Err(AuditError::RecordMismatch {
                field: "depth".to_string(),
            });
        }
        if tree.root() != self.root {
            return Err(AuditError::RecordMismatch {
                field: "root".to_string(),
            });
        }
        Ok(tree)
    }

    pub fn to_json(&self) -> Result<String> {
        to_json(self)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        from_json(json)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode_envelope(record_format::PRIVATE_MAGIC, self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_envelope(record_format::PRIVATE_MAGIC, bytes)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AuditError::Serialization(format!("Failed to encode record: {}", e)))
}

fn from_json<T: DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json)
        .map_err(|e| AuditError::Serialization(format!("Failed to decode record: {}", e)))
}

// Pinned bincode options so the envelope stays stable if bincode's defaults change.
fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_RECORD_SIZE_BYTES as u64)
        .reject_trailing_bytes()
}

fn encode_envelope<T: Serialize>(magic: &[u8; 4], value: &T) -> Result<Vec<u8>> {
    let body = bincode_options()
        .serialize(value)
        .map_err(|e| AuditError::Serialization(format!("Failed to serialize record: {}", e)))?;
    let length = u32::try_from(body.len())
        .map_err(|_| AuditError::Serialization("Record too large for envelope".to_string()))?;

    let mut result = Vec::with_capacity(record_format::HEADER_SIZE + body.len());
    result.extend_from_slice(magic);
    result.extend_from_slice(&RECORD_FORMAT_VERSION.to_le_bytes());
    result.extend_from_slice(&length.to_le_bytes());
    result.extend_from_slice(&body);
    Ok(result)
}

fn decode_envelope<T: DeserializeOwned>(magic: &[u8; 4], bytes: &[u8]) -> Result<T> {
    if bytes.len() < record_format::HEADER_SIZE {
        return Err(AuditError::Serialization(
            "Record bytes too short for header".to_string(),
        ));
    }
    if bytes.len() > MAX_RECORD_SIZE_BYTES {
        return Err(AuditError::Serialization(format!(
            "Record exceeds maximum size of {} bytes",
            MAX_RECORD_SIZE_BYTES
        )));
    }

    if &bytes[0..4] != magic {
        return Err(AuditError::Serialization(
            "Invalid magic bytes in record".to_string(),
        ));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != RECORD_FORMAT_VERSION {
        return Err(AuditError::Serialization(format!(
            "Unsupported record format version: {}",
            version
        )));
    }

    let length = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
    let expected_len = record_format::HEADER_SIZE + length;
    if bytes.len() < expected_len {
        return Err(AuditError::Serialization(
            "Record bytes truncated".to_string(),
        ));
    }
    if bytes.len() > expected_len {
        return Err(AuditError::Serialization(
            "Record bytes contain trailing data".to_string(),
        ));
    }

    bincode_options()
        .deserialize(&bytes[record_format::HEADER_SIZE..])
        .map_err(|e| AuditError::Serialization(format!("Failed to deserialize record: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_private() -> PrivateRecord {
        PrivateRecord {
            root: Digest::from([9u8; 32]),
            depth: 1,
            challenges: vec![Challenge::from_bytes([1u8; 32])].into(),
        }
    }

    #[test]
    fn test_envelope_rejects_wrong_magic() {
        let bytes = sample_private().to_bytes().unwrap();
        let err = PublicRecord::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn test_envelope_rejects_truncation_and_trailing_data() {
        let bytes = sample_private().to_bytes().unwrap();
        assert!(PrivateRecord::from_bytes(&bytes[..bytes.len() - 1]).is_err());

        let mut extended = bytes.clone();
        extended.push(0);
        assert!(PrivateRecord::from_bytes(&extended).is_err());

        assert_eq!(PrivateRecord::from_bytes(&bytes).unwrap(), sample_private());
    }

    #[test]
    fn test_private_json_shape() {
        let json = sample_private().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["root"], "09".repeat(32));
        assert_eq!(value["depth"], 1);
        assert_eq!(value["challenges"][0], "01".repeat(32));
    }
}
