//! Shard audit library
//!
//! Generates Proof-of-Retrievability audit material for a storage shard. A verifier picks
//! a set of secret random challenges, hashes the shard once per challenge, and commits to
//! the resulting responses with a Merkle tree. The leaves are handed to the data holder;
//! the root, depth and challenges stay with the verifier for later audits.
//!
//! ## Main Components
//!
//! - [`challenge`]: Challenge values and injectable challenge sources
//! - [`response`]: Per-challenge incremental response hashing
//! - [`merkle`]: SHA-256 Merkle tree over response leaves
//! - [`audit`]: Eager builder for shards already in memory
//! - [`stream`]: Streaming builder with memory bounded by the audit count
//! - [`record`]: Public and private audit records
//! - [`config`]: Centralized configuration constants
//!
//! ## Error Handling
//!
//! Fallible operations return `Result<T, AuditError>`:
//!
//! - `Audit::new()` returns `Result<Audit, AuditError>`
//! - `AuditStream::write()` returns `Result<(), AuditError>`
//! - `AuditStream::end()` returns `Result<&AuditOutcome, AuditError>`
//! - `AuditStream::get_public_record()` returns `Result<PublicRecord, AuditError>`
//!
//! ## Quick Start
//!
//! ### Eager
//! ```rust,no_run
//! use shard_audit::{Audit, AuditError};
//!
//! let audit = Audit::new(12, b"testshard")?;
//! let public = audit.get_public_record();
//! let private = audit.get_private_record();
//! assert_eq!(public.len(), 16);
//! assert_eq!(private.depth, 4);
//! assert_eq!(private.challenges.len(), 12);
//! # Ok::<(), AuditError>(())
//! ```
//!
//! ### Streaming
//! ```rust,no_run
//! use shard_audit::{AuditError, AuditStream};
//!
//! let mut stream = AuditStream::new(12)?;
//! stream.write(b"test")?;
//! stream.write(b"shard")?;
//! let outcome = stream.end()?;
//! println!("root: {}", outcome.private_record().root);
//! # Ok::<(), AuditError>(())
//! ```

pub mod audit;
pub mod challenge;
pub mod config;
pub mod error;
pub mod merkle;
pub mod record;
pub mod response;
pub mod stream;

// Re-export commonly used types and functions for convenience
pub use audit::{Audit, AuditConfig, AuditOutcome, PendingAudit};
pub use challenge::{
    generate_challenges, Challenge, ChallengeSource, OsChallengeSource, SeededChallengeSource,
};
pub use error::{AuditError, Result};
pub use merkle::{hash_node, padding_leaf, Digest, MerkleTree};
pub use record::{PrivateRecord, PublicRecord};
pub use response::{respond, ResponseAccumulator};
pub use stream::AuditStream;
