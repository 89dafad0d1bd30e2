//! Challenge generation for audit sessions.
//!
//! A challenge is a 256-bit secret drawn from a cryptographically secure source and
//! carried around as 64 lowercase hex characters. Sessions pull challenges through the
//! [`ChallengeSource`] trait so tests can inject a deterministic sequence.

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug_span;

use crate::config::{CHALLENGE_HEX_LEN, CHALLENGE_SIZE_BYTES};
use crate::{AuditError, Result};

/// A single audit challenge: 32 raw bytes plus their lowercase hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Challenge {
    bytes: [u8; CHALLENGE_SIZE_BYTES],
    hex: String,
}

impl Challenge {
    /// Wraps raw challenge bytes.
    pub fn from_bytes(bytes: [u8; CHALLENGE_SIZE_BYTES]) -> Self {
        Challenge {
            bytes,
            hex: hex::encode(bytes),
        }
    }

    /// Parses an externally supplied challenge, normalizing it to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `InvalidChallenge` unless the input is exactly 64 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != CHALLENGE_HEX_LEN {
            return Err(AuditError::InvalidChallenge(format!(
                "expected {} hex characters, got {}",
                CHALLENGE_HEX_LEN,
                hex_str.len()
            )));
        }
        let mut bytes = [0u8; CHALLENGE_SIZE_BYTES];
        hex::decode_to_slice(hex_str, &mut bytes)
            .map_err(|e| AuditError::InvalidChallenge(format!("{hex_str}: {e}")))?;
        Ok(Self::from_bytes(bytes))
    }

    /// The hex representation.
    pub fn as_str(&self) -> &str {
        &self.hex
    }

    /// The 32 raw bytes.
    pub fn to_bytes(&self) -> [u8; CHALLENGE_SIZE_BYTES] {
        self.bytes
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

impl AsRef<str> for Challenge {
    fn as_ref(&self) -> &str {
        &self.hex
    }
}

impl TryFrom<String> for Challenge {
    type Error = AuditError;

    fn try_from(value: String) -> Result<Self> {
        Challenge::from_hex(&value)
    }
}

impl From<Challenge> for String {
    fn from(challenge: Challenge) -> Self {
        challenge.hex
    }
}

/// Anything that can hand out challenges for a session.
pub trait ChallengeSource {
    /// Produces the next challenge in sequence.
    fn next_challenge(&mut self) -> Result<Challenge>;
}

/// Draws challenges from the operating system's CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsChallengeSource;

impl ChallengeSource for OsChallengeSource {
    fn next_challenge(&mut self) -> Result<Challenge> {
        let mut bytes = [0u8; CHALLENGE_SIZE_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AuditError::RandomSource(e.to_string()))?;
        Ok(Challenge::from_bytes(bytes))
    }
}

/// Reproducible challenges from a seeded `StdRng`.
///
/// Not suitable for real audits: anyone who learns the seed can precompute every
/// response.
#[derive(Debug, Clone)]
pub struct SeededChallengeSource {
    rng: StdRng,
}

impl SeededChallengeSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ChallengeSource for SeededChallengeSource {
    fn next_challenge(&mut self) -> Result<Challenge> {
        let mut bytes = [0u8; CHALLENGE_SIZE_BYTES];
        self.rng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AuditError::RandomSource(e.to_string()))?;
        Ok(Challenge::from_bytes(bytes))
    }
}

impl<F> ChallengeSource for F
where
    F: FnMut() -> Result<Challenge>,
{
    fn next_challenge(&mut self) -> Result<Challenge> {
        self()
    }
}

/// Generates `count` challenges from `source`, in order.
///
/// The count is not validated here; sessions validate it before calling.
pub fn generate_challenges<S>(source: &mut S, count: usize) -> Result<Arc<[Challenge]>>
where
    S: ChallengeSource + ?Sized,
{
    let _span = debug_span!("generate_challenges", count).entered();

    let challenges = (0..count)
        .map(|_| source.next_challenge())
        .collect::<Result<Vec<_>>>()?;
    Ok(challenges.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_normalizes_case() {
        let upper = "AB".repeat(32);
        let challenge = Challenge::from_hex(&upper).unwrap();
        assert_eq!(challenge.as_str(), "ab".repeat(32));
        assert_eq!(challenge.to_bytes(), [0xab; 32]);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(Challenge::from_hex("abcd").is_err());
        assert!(Challenge::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn test_bytes_and_hex_agree() {
        let bytes: [u8; 32] = std::array::from_fn(|i| i as u8);
        let challenge = Challenge::from_bytes(bytes);
        assert_eq!(challenge.to_bytes(), bytes);
        assert_eq!(Challenge::from_hex(challenge.as_str()).unwrap(), challenge);

        let json = serde_json::to_string(&challenge).unwrap();
        assert_eq!(json, format!("\"{}\"", challenge));
        let restored: Challenge = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.to_bytes(), bytes);
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let a = generate_challenges(&mut SeededChallengeSource::new(7), 4).unwrap();
        let b = generate_challenges(&mut SeededChallengeSource::new(7), 4).unwrap();
        let c = generate_challenges(&mut SeededChallengeSource::new(8), 4).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_closure_source_failure_propagates() {
        let mut calls = 0;
        let mut source = || {
            calls += 1;
            if calls > 2 {
                Err(AuditError::RandomSource("exhausted".to_string()))
            } else {
                Ok(Challenge::from_bytes([calls as u8; 32]))
            }
        };
        let err = generate_challenges(&mut source, 5).unwrap_err();
        assert!(matches!(err, AuditError::RandomSource(_)));
    }
}
