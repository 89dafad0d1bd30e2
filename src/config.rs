//! Centralized configuration for shard audits.
//!
//! This module contains constants and default parameters used throughout the
//! crate to ensure consistency and ease of modification.

use crate::{AuditError, Result};

// --- Challenge Parameters ---

/// Size of a raw challenge in bytes (256 bits).
pub const CHALLENGE_SIZE_BYTES: usize = 32;

/// Length of a hex-encoded challenge.
pub const CHALLENGE_HEX_LEN: usize = CHALLENGE_SIZE_BYTES * 2;

/// Audit count used when a stream is constructed without an explicit count.
pub const DEFAULT_AUDIT_COUNT: usize = 12;

/// Maximum number of challenges per session (prevents resource exhaustion)
pub const MAX_AUDIT_COUNT: usize = 10_000;

// --- Hashing and Merkle Tree Parameters ---

/// Size of every leaf and node digest (SHA-256).
pub const DIGEST_SIZE_BYTES: usize = 32;

// --- Streaming Parameters ---

/// Read size used by the CLI when streaming a shard from disk.
pub const DEFAULT_STREAM_CHUNK_SIZE: usize = 64 * 1024;

// --- Record I/O Constants ---

/// Current record envelope format version
pub const RECORD_FORMAT_VERSION: u16 = 1;

/// Maximum size for a serialized record envelope (16 MB)
pub const MAX_RECORD_SIZE_BYTES: usize = 16 * 1024 * 1024;

// --- Test-related Constants ---

/// A fixed random seed used in tests to ensure deterministic behavior.
pub const TEST_RANDOM_SEED: u64 = 42;

/// Validates an audit count supplied by a caller.
///
/// Accepts any integer type so that signed input (for example from a CLI or a
/// deserialized request) is rejected the same way as zero.
pub fn validate_audit_count<T>(count: T) -> Result<usize>
where
    T: TryInto<usize> + Copy + std::fmt::Display,
{
    let value: usize = count.try_into().map_err(|_| {
        AuditError::Configuration(format!("audit count must be a positive integer, got {count}"))
    })?;

    if value == 0 {
        return Err(AuditError::Configuration(
            "audit count must be greater than zero".to_string(),
        ));
    }
    if value > MAX_AUDIT_COUNT {
        return Err(AuditError::Configuration(format!(
            "audit count {value} exceeds limit of {MAX_AUDIT_COUNT}"
        )));
    }

    Ok(value)
}
