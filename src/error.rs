//! Error types for the shard audit library

/// Error types for the shard audit library
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Audit count missing, non-positive, or above the supported maximum
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The cryptographic random source could not produce a challenge
    #[error("Random source error: {0}")]
    RandomSource(String),

    /// Operation issued out of order for the session lifecycle
    #[error("Sequence error: {operation} {reason}")]
    Sequence { operation: String, reason: String },

    /// Hash computation could not proceed
    #[error("Hash context error: {0}")]
    HashContext(String),

    /// Externally supplied challenge is malformed
    #[error("Invalid challenge: {0}")]
    InvalidChallenge(String),

    /// Empty data provided where non-empty data is required
    #[error("Empty data: {operation} requires non-empty input data")]
    EmptyData { operation: String },

    /// Index out of bounds
    #[error("Index out of bounds: index {index}, length {length}")]
    IndexOutOfBounds { index: usize, length: usize },

    /// Stored audit records disagree with each other
    #[error("Record mismatch: {field} does not match the recomputed tree")]
    RecordMismatch { field: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO operation failed
    #[error("IO error: {0}")]
    IO(String),
}

impl AuditError {
    pub(crate) fn sequence(operation: &str, reason: &str) -> Self {
        AuditError::Sequence {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        AuditError::IO(err.to_string())
    }
}

/// Convenience Result type for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;
