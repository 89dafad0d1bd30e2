//! Test fixtures: deterministic challenge sources and shard data.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use sha2::{Digest, Sha256};
use shard_audit::{Challenge, ChallengeSource, Result};

/// The shard used by the end-to-end scenarios.
pub const SHARD: &[u8] = b"testshard";

/// `h(i)`: the i-th challenge of the counter source, SHA-256 of the decimal counter.
pub fn counter_challenge(i: u64) -> Challenge {
    let digest: [u8; 32] = Sha256::digest(i.to_string().as_bytes()).into();
    Challenge::from_bytes(digest)
}

/// A stub source yielding `h(1), h(2), ...` with its own counter.
pub fn counter_source() -> impl ChallengeSource {
    let mut counter = 0u64;
    move || -> Result<Challenge> {
        counter += 1;
        Ok(counter_challenge(counter))
    }
}

/// Deterministic pseudo-random shard bytes.
pub fn random_shard(size: usize, seed: u64) -> Vec<u8> {
    let mut data = vec![0u8; size];
    StdRng::seed_from_u64(seed).fill_bytes(&mut data);
    data
}

/// Splits `data` at random points into chunks (some possibly empty).
pub fn random_chunks(data: &[u8], seed: u64) -> Vec<&[u8]> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut chunks = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        let take = rng.gen_range(0..=rest.len().min(97));
        let (head, tail) = rest.split_at(take);
        chunks.push(head);
        rest = tail;
    }
    chunks
}
