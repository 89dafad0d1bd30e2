//! Streaming audit construction.
//!
//! [`AuditStream`] accepts the shard in arbitrary chunks through [`AuditStream::write`]
//! (or `std::io::Write`) and keeps one SHA-256 context per challenge, so memory does not
//! grow with the shard. [`AuditStream::end`] closes every context, builds the tree and
//! hands back the finished [`AuditOutcome`].
//!
//! A session moves through `Writing -> Finished` exactly once. A hashing failure while
//! writing moves it to `Failed`, after which every operation reports the original fault.

use std::io;
use std::sync::Arc;
use tracing::{debug_span, trace, warn};

use crate::audit::{Audit, AuditOutcome};
use crate::challenge::{generate_challenges, Challenge, ChallengeSource, OsChallengeSource};
use crate::config::{validate_audit_count, DEFAULT_AUDIT_COUNT};
use crate::record::{PrivateRecord, PublicRecord};
use crate::response::ResponseAccumulator;
use crate::{AuditError, Result};

#[derive(Debug)]
enum StreamState {
    Writing(Vec<ResponseAccumulator>),
    Finished(AuditOutcome),
    Failed(String),
}

/// An audit session fed incrementally.
#[derive(Debug)]
pub struct AuditStream {
    challenges: Arc<[Challenge]>,
    state: StreamState,
    bytes_written: u64,
}

impl AuditStream {
    /// Starts a session with `audit_count` challenges from the operating system's CSPRNG.
    pub fn new(audit_count: usize) -> Result<Self> {
        Self::with_source(audit_count, &mut OsChallengeSource)
    }

    /// Starts a session with [`DEFAULT_AUDIT_COUNT`] challenges.
    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_AUDIT_COUNT)
    }

    /// Starts a session with challenges drawn from `source`.
    pub fn with_source<S>(audit_count: usize, source: &mut S) -> Result<Self>
    where
        S: ChallengeSource + ?Sized,
    {
        let audit_count = validate_audit_count(audit_count)?;
        let challenges = generate_challenges(source, audit_count)?;
        let accumulators = challenges.iter().map(ResponseAccumulator::new).collect();

        Ok(Self {
            challenges,
            state: StreamState::Writing(accumulators),
            bytes_written: 0,
        })
    }

    /// Feeds the next chunk of the shard to every challenge's accumulator.
    ///
    /// # Errors
    ///
    /// - `Sequence` after [`end`](Self::end) or after the session failed
    /// - `HashContext` if an accumulator cannot take the chunk; the session is then
    ///   unusable
    pub fn write(&mut self, chunk: &[u8]) -> Result<()> {
        let result = match &mut self.state {
            StreamState::Writing(accumulators) => accumulators
                .iter_mut()
                .try_for_each(|accumulator| accumulator.consume(chunk)),
            StreamState::Finished(_) => {
                return Err(AuditError::sequence("write", "called after end"));
            }
            StreamState::Failed(reason) => {
                return Err(failed_error("write", reason));
            }
        };

        match result {
            Ok(()) => {
                self.bytes_written += chunk.len() as u64;
                trace!(chunk = chunk.len(), total = self.bytes_written, "shard chunk consumed");
                Ok(())
            }
            Err(err) => {
                self.poison(&err);
                Err(err)
            }
        }
    }

    /// Signals end of input, finalizes every response and builds the audit tree.
    ///
    /// Returns the completed outcome; this is the session's single completion signal.
    ///
    /// # Errors
    ///
    /// `Sequence` if called twice or after a failure.
    pub fn end(&mut self) -> Result<&AuditOutcome> {
        let state = std::mem::replace(
            &mut self.state,
            StreamState::Failed("finalization did not complete".to_string()),
        );

        let accumulators = match state {
            StreamState::Writing(accumulators) => accumulators,
            StreamState::Finished(outcome) => {
                self.state = StreamState::Finished(outcome);
                return Err(AuditError::sequence("end", "called more than once"));
            }
            StreamState::Failed(reason) => {
                let err = failed_error("end", &reason);
                self.state = StreamState::Failed(reason);
                return Err(err);
            }
        };

        let _span = debug_span!(
            "audit_stream_end",
            audit_count = self.challenges.len(),
            shard_size = self.bytes_written
        )
        .entered();

        let leaves: Vec<_> = accumulators
            .into_iter()
            .map(ResponseAccumulator::finalize)
            .collect();

        match AuditOutcome::from_leaves(Arc::clone(&self.challenges), &leaves) {
            Ok(outcome) => {
                self.state = StreamState::Finished(outcome);
                self.finished("end")
            }
            Err(err) => {
                self.poison(&err);
                Err(err)
            }
        }
    }

    /// Whether [`end`](Self::end) has completed successfully.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, StreamState::Finished(_))
    }

    /// Total shard bytes accepted so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// The challenge sequence, available from construction onwards.
    pub fn challenges(&self) -> &Arc<[Challenge]> {
        &self.challenges
    }

    /// The finished outcome.
    ///
    /// # Errors
    ///
    /// `Sequence` before completion or after a failure.
    pub fn outcome(&self) -> Result<&AuditOutcome> {
        self.finished("outcome")
    }

    pub fn get_public_record(&self) -> Result<PublicRecord> {
        self.finished("get_public_record")
            .map(AuditOutcome::public_record)
    }

    pub fn get_private_record(&self) -> Result<PrivateRecord> {
        self.finished("get_private_record")
            .map(AuditOutcome::private_record)
    }

    /// Converts a finished stream into an eager [`Audit`] holding the same outcome.
    pub fn into_audit(self) -> Result<Audit> {
        match self.state {
            StreamState::Finished(outcome) => Ok(Audit::from_outcome(outcome)),
            StreamState::Writing(_) => {
                Err(AuditError::sequence("into_audit", "called before end"))
            }
            StreamState::Failed(reason) => Err(failed_error("into_audit", &reason)),
        }
    }

    fn finished(&self, operation: &str) -> Result<&AuditOutcome> {
        match &self.state {
            StreamState::Finished(outcome) => Ok(outcome),
            StreamState::Writing(_) => Err(AuditError::sequence(operation, "called before end")),
            StreamState::Failed(reason) => Err(failed_error(operation, reason)),
        }
    }

    fn poison(&mut self, err: &AuditError) {
        warn!(error = %err, "audit stream failed; session is no longer usable");
        self.state = StreamState::Failed(err.to_string());
    }
}

fn failed_error(operation: &str, reason: &str) -> AuditError {
    AuditError::sequence(operation, &format!("called after session failure ({reason})"))
}

impl io::Write for AuditStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        AuditStream::write(self, buf).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
