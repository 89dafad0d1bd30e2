//! Per-challenge response hashing.
//!
//! Each challenge owns one [`ResponseAccumulator`]. The accumulator derives a seed by
//! hashing the challenge's hex string, then feeds that seed followed by every shard byte
//! into a second SHA-256 context:
//!
//! ```text
//! seed = SHA256(challenge_hex)
//! leaf = SHA256(seed || shard)
//! ```
//!
//! Chunk boundaries are invisible to the outer context, so a shard written in one piece
//! or in many yields the same leaf.

use sha2::{Digest as _, Sha256};

use crate::challenge::Challenge;
use crate::merkle::Digest;
use crate::{AuditError, Result};

/// Incremental response state bound to one challenge.
#[derive(Debug, Clone)]
pub struct ResponseAccumulator {
    hasher: Sha256,
    bytes_consumed: u64,
}

impl ResponseAccumulator {
    /// Seeds a new accumulator from `challenge`.
    pub fn new(challenge: &Challenge) -> Self {
        let seed = Sha256::digest(challenge.as_str().as_bytes());
        let mut hasher = Sha256::new();
        hasher.update(seed);
        Self {
            hasher,
            bytes_consumed: 0,
        }
    }

    /// Folds the next chunk of shard bytes into the response.
    ///
    /// # Errors
    ///
    /// Returns `HashContext` if the running byte count would overflow, which SHA-256
    /// cannot represent in its length padding.
    pub fn consume(&mut self, chunk: &[u8]) -> Result<()> {
        let len = u64::try_from(chunk.len())
            .map_err(|_| AuditError::HashContext("chunk length exceeds u64".to_string()))?;
        // SHA-256 encodes the message length in bits as a u64.
        self.bytes_consumed = self
            .bytes_consumed
            .checked_add(len)
            .filter(|total| *total <= u64::MAX / 8)
            .ok_or_else(|| {
                AuditError::HashContext("shard exceeds the SHA-256 length limit".to_string())
            })?;
        self.hasher.update(chunk);
        Ok(())
    }

    /// Number of shard bytes folded in so far.
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// Closes the outer hash and returns the leaf for this challenge.
    pub fn finalize(self) -> Digest {
        let bytes: [u8; 32] = self.hasher.finalize().into();
        Digest::from(bytes)
    }
}

/// One-shot response over a shard that is already in memory.
pub fn respond(challenge: &Challenge, shard: &[u8]) -> Result<Digest> {
    let mut accumulator = ResponseAccumulator::new(challenge);
    accumulator.consume(shard)?;
    Ok(accumulator.finalize())
}
