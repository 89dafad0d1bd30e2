//! Challenge generation: shape, uniqueness and byte uniformity.

use shard_audit::{
    config::{CHALLENGE_HEX_LEN, CHALLENGE_SIZE_BYTES, TEST_RANDOM_SEED},
    generate_challenges, Audit, AuditStream, Challenge, OsChallengeSource, SeededChallengeSource,
};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::collections::HashSet;

fn assert_well_formed(challenge: &Challenge) {
    assert_eq!(challenge.as_str().len(), CHALLENGE_HEX_LEN);
    assert!(challenge
        .as_str()
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    let decoded = hex::decode(challenge.as_str()).unwrap();
    assert_eq!(decoded.len(), CHALLENGE_SIZE_BYTES);
    assert_eq!(decoded, challenge.to_bytes());
}

#[test]
fn test_random_challenge_is_256_bits() {
    let challenges = generate_challenges(&mut OsChallengeSource, 6).unwrap();
    assert_eq!(challenges.len(), 6);
    challenges.iter().for_each(assert_well_formed);
}

#[test]
fn test_session_generates_requested_challenge_count() {
    for n in [1usize, 2, 7, 12, 24, 33] {
        let stream = AuditStream::new(n).unwrap();
        assert_eq!(stream.challenges().len(), n);

        let audit = Audit::new(n, b"shard").unwrap();
        assert_eq!(audit.challenges().len(), n);
        audit.challenges().iter().for_each(assert_well_formed);
    }
}

#[test]
fn test_challenges_within_a_call_are_distinct() {
    let challenges = generate_challenges(&mut OsChallengeSource, 512).unwrap();
    let unique: HashSet<_> = challenges.iter().collect();
    assert_eq!(unique.len(), challenges.len());
}

#[test]
fn test_independent_sessions_do_not_share_challenges() {
    let a = AuditStream::new(8).unwrap();
    let b = AuditStream::new(8).unwrap();
    let seen: HashSet<_> = a.challenges().iter().collect();
    assert!(b.challenges().iter().all(|c| !seen.contains(c)));
}

#[test]
fn test_challenge_bytes_are_uniform() {
    const CHALLENGES: usize = 2_000;
    const BUCKETS: usize = 256;

    let mut source = SeededChallengeSource::new(TEST_RANDOM_SEED);
    let challenges = generate_challenges(&mut source, CHALLENGES).unwrap();

    let mut histogram = [0usize; BUCKETS];
    for challenge in challenges.iter() {
        for byte in challenge.to_bytes() {
            histogram[byte as usize] += 1;
        }
    }

    // Chi-squared goodness-of-fit against a uniform byte distribution
    let total = (CHALLENGES * CHALLENGE_SIZE_BYTES) as f64;
    let expected = total / BUCKETS as f64;
    let chi2: f64 = histogram
        .iter()
        .map(|&obs| {
            let o = obs as f64;
            (o - expected) * (o - expected) / expected
        })
        .sum();

    let dof = (BUCKETS - 1) as f64;
    let dist = ChiSquared::new(dof).expect("chi2");
    let p_value = dist.sf(chi2);
    let alpha = 0.001;

    println!(
        "Challenge byte chi2: stat={:.2}, p={:.4}, df={}",
        chi2, p_value, dof
    );
    assert!(
        p_value > alpha,
        "Byte distribution deviates from uniform (p <= {}).",
        alpha
    );
}
