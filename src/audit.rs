//! Eager audit construction.
//!
//! [`Audit`] takes a shard that is already in memory and produces the finished audit tree
//! before its constructor returns. [`PendingAudit`] splits challenge generation from the
//! shard hand-off for callers that fix the audit count before the data is available.
//! Both share [`AuditOutcome`] with the streaming builder, so the two variants cannot
//! disagree on how leaves become records.

use std::sync::Arc;
use tracing::{debug, debug_span};

use crate::challenge::{generate_challenges, Challenge, ChallengeSource, OsChallengeSource};
use crate::config::validate_audit_count;
use crate::merkle::{Digest, MerkleTree};
use crate::record::{PrivateRecord, PublicRecord};
use crate::response::respond;
use crate::{AuditError, Result};

/// The immutable result of a completed audit session.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    tree: MerkleTree,
    challenges: Arc<[Challenge]>,
}

impl AuditOutcome {
    /// Builds the audit tree from one finalized leaf per challenge.
    pub(crate) fn from_leaves(challenges: Arc<[Challenge]>, leaves: &[Digest]) -> Result<Self> {
        if leaves.len() != challenges.len() {
            return Err(AuditError::HashContext(format!(
                "{} leaves finalized for {} challenges",
                leaves.len(),
                challenges.len()
            )));
        }

        let tree = MerkleTree::build(leaves)?;
        debug!(
            leaves = leaves.len(),
            depth = tree.levels(),
            root = %tree.root(),
            "audit tree finalized"
        );
        Ok(Self { tree, challenges })
    }

    /// The padded bottom level of the tree.
    pub fn public_record(&self) -> PublicRecord {
        PublicRecord::new(self.tree.leaves().to_vec())
    }

    /// Root, depth, and the challenge sequence that seeded the leaves.
    pub fn private_record(&self) -> PrivateRecord {
        PrivateRecord {
            root: self.tree.root(),
            depth: self.tree.levels(),
            challenges: Arc::clone(&self.challenges),
        }
    }

    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }

    pub fn challenges(&self) -> &Arc<[Challenge]> {
        &self.challenges
    }
}

/// Construction arguments for an eager audit.
#[derive(Debug, Clone, Copy)]
pub struct AuditConfig<'a> {
    /// Number of challenges (and leaves before padding)
    pub audit_count: usize,
    /// The complete shard
    pub shard: &'a [u8],
}

/// Challenges fixed, shard not yet supplied.
#[derive(Debug, Clone)]
pub struct PendingAudit {
    challenges: Arc<[Challenge]>,
}

impl PendingAudit {
    /// Generates `audit_count` challenges from the operating system's CSPRNG.
    pub fn new(audit_count: usize) -> Result<Self> {
        Self::with_source(audit_count, &mut OsChallengeSource)
    }

    /// Generates `audit_count` challenges from `source`.
    pub fn with_source<S>(audit_count: usize, source: &mut S) -> Result<Self>
    where
        S: ChallengeSource + ?Sized,
    {
        let audit_count = validate_audit_count(audit_count)?;
        let challenges = generate_challenges(source, audit_count)?;
        Ok(Self { challenges })
    }

    pub fn challenges(&self) -> &Arc<[Challenge]> {
        &self.challenges
    }

    /// Hashes the whole shard against every challenge and builds the tree.
    pub fn finish(self, shard: &[u8]) -> Result<Audit> {
        let _span = debug_span!(
            "audit",
            audit_count = self.challenges.len(),
            shard_size = shard.len()
        )
        .entered();

        let leaves = self
            .challenges
            .iter()
            .map(|challenge| respond(challenge, shard))
            .collect::<Result<Vec<_>>>()?;
        let outcome = AuditOutcome::from_leaves(self.challenges, &leaves)?;
        Ok(Audit { outcome })
    }
}

/// A completed eager audit session.
#[derive(Debug, Clone)]
pub struct Audit {
    outcome: AuditOutcome,
}

impl Audit {
    /// Audits `shard` with `audit_count` random challenges.
    ///
    /// # Errors
    ///
    /// - `Configuration` if `audit_count` is zero or above the limit
    /// - `RandomSource` if the CSPRNG fails
    pub fn new(audit_count: usize, shard: &[u8]) -> Result<Self> {
        PendingAudit::new(audit_count)?.finish(shard)
    }

    /// Audits `shard` with challenges drawn from `source`.
    pub fn with_source<S>(audit_count: usize, shard: &[u8], source: &mut S) -> Result<Self>
    where
        S: ChallengeSource + ?Sized,
    {
        PendingAudit::with_source(audit_count, source)?.finish(shard)
    }

    pub fn from_config(config: AuditConfig<'_>) -> Result<Self> {
        Self::new(config.audit_count, config.shard)
    }

    pub(crate) fn from_outcome(outcome: AuditOutcome) -> Self {
        Audit { outcome }
    }

    /// Restores a completed session from previously issued records.
    ///
    /// The tree is rebuilt from the public leaves and must reproduce the private root and
    /// depth exactly.
    pub fn from_records(private: PrivateRecord, public: &PublicRecord) -> Result<Self> {
        let _span = debug_span!("audit_from_records", leaves = public.len()).entered();

        validate_audit_count(private.challenges.len())?;
        let tree = private.check_public(public)?;
        Ok(Audit {
            outcome: AuditOutcome {
                tree,
                challenges: private.challenges,
            },
        })
    }

    pub fn get_public_record(&self) -> PublicRecord {
        self.outcome.public_record()
    }

    pub fn get_private_record(&self) -> PrivateRecord {
        self.outcome.private_record()
    }

    pub fn tree(&self) -> &MerkleTree {
        self.outcome.tree()
    }

    pub fn challenges(&self) -> &Arc<[Challenge]> {
        self.outcome.challenges()
    }
}
