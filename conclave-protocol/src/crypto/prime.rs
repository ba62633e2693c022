//! Probabilistic prime generation.
//!
//! Candidates are screened with Fermat's little theorem against every prime of a
//! small sieve table. This is deliberately *not* Miller–Rabin: Fermat
//! pseudo-primes that pass every base are accepted, and switching tests would
//! change which keys a given RNG seed produces.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::Rng;
use thiserror::Error;

/// Sieve limit for the Fermat base table (168 primes below 1000).
pub const DEFAULT_SIEVE_LIMIT: u32 = 1000;

/// Bit size of generated pseudo-primes.
pub const DEFAULT_PRIME_BITS: u64 = 512;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimeError {
    #[error("No pseudo-prime found after {0} candidates")]
    SearchExhausted(u64),
}

pub type Result<T> = std::result::Result<T, PrimeError>;

/// All primes strictly below `limit`, by trial division against the primes
/// already found.
pub fn sieve(limit: u32) -> Vec<u32> {
    let mut primes: Vec<u32> = Vec::new();
    for candidate in 2..limit {
        if primes.iter().all(|p| candidate % p != 0) {
            primes.push(candidate);
        }
    }
    primes
}

/// Random odd integer of at most `bits` bits.
pub fn random_odd_candidate<R: Rng + ?Sized>(rng: &mut R, bits: u64) -> BigUint {
    rng.gen_biguint(bits) | BigUint::one()
}

/// Fermat test of `n` under `base`.
///
/// Returns false straight away when `base` divides `n`; otherwise true iff
/// `base^(n-1) ≡ 1 (mod n)`.
pub fn fermat_test(base: u32, n: &BigUint) -> bool {
    if n.is_zero() {
        return false;
    }
    let b = BigUint::from(base);
    if (n % &b).is_zero() {
        return false;
    }
    let exponent = n - BigUint::one();
    b.modpow(&exponent, n).is_one()
}

/// True iff `n` passes [`fermat_test`] for every base in `bases`.
pub fn passes_fermat_bases(bases: &[u32], n: &BigUint) -> bool {
    for &base in bases {
        if !fermat_test(base, n) {
            if base > 2 {
                log::trace!("candidate rejected by Fermat base {}", base);
            }
            return false;
        }
    }
    true
}

/// Sample random odd candidates until one greater than 1 passes every base.
///
/// `max_attempts = None` searches without bound. With `Some(k)` the search
/// gives up after `k` candidates.
pub fn pseudo_prime<R: Rng + ?Sized>(
    bases: &[u32],
    bits: u64,
    rng: &mut R,
    max_attempts: Option<u64>,
) -> Result<BigUint> {
    let one = BigUint::one();
    let mut attempts: u64 = 0;

    loop {
        if let Some(max) = max_attempts {
            if attempts >= max {
                log::warn!("Pseudo-prime search gave up after {} candidates", attempts);
                return Err(PrimeError::SearchExhausted(attempts));
            }
        }
        attempts += 1;

        let candidate = random_odd_candidate(rng, bits);
        if candidate > one && passes_fermat_bases(bases, &candidate) {
            log::debug!("Found {}-bit pseudo-prime after {} candidates", bits, attempts);
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_integer::Integer;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_sieve_small() {
        assert_eq!(sieve(30), vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert!(sieve(2).is_empty());
        assert_eq!(sieve(3), vec![2]);
    }

    #[test]
    fn test_sieve_default_limit() {
        let primes = sieve(DEFAULT_SIEVE_LIMIT);
        assert_eq!(primes.len(), 168);
        assert_eq!(*primes.last().unwrap(), 997);
    }

    #[test]
    fn test_random_odd_candidate_bounds() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..64 {
            let c = random_odd_candidate(&mut rng, 64);
            assert!(c.is_odd());
            assert!(c.bits() <= 64);
        }
    }

    #[test]
    fn test_fermat_primes_pass() {
        for p in [5u32, 13, 101, 7919] {
            assert!(fermat_test(2, &BigUint::from(p)), "{} should pass base 2", p);
        }
    }

    #[test]
    fn test_fermat_divisible_fails_immediately() {
        // 3 divides 9; also the base itself is rejected
        assert!(!fermat_test(3, &BigUint::from(9u32)));
        assert!(!fermat_test(3, &BigUint::from(3u32)));
    }

    #[test]
    fn test_fermat_composite_fails() {
        assert!(!fermat_test(2, &BigUint::from(15u32)));
        assert!(!fermat_test(2, &BigUint::from(91u32)));
    }

    #[test]
    fn test_fermat_pseudoprime_accepted() {
        // 341 = 11 * 31, the smallest base-2 Fermat pseudo-prime
        assert!(fermat_test(2, &BigUint::from(341u32)));
        assert!(!fermat_test(3, &BigUint::from(341u32)));
    }

    #[test]
    fn test_pseudo_prime_passes_all_bases() {
        let bases = sieve(DEFAULT_SIEVE_LIMIT);
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let p = pseudo_prime(&bases, 128, &mut rng, None).unwrap();
        assert!(p.bits() <= 128);
        assert!(passes_fermat_bases(&bases, &p));
    }

    #[test]
    fn test_pseudo_prime_deterministic_for_seed() {
        let bases = sieve(100);
        let a = pseudo_prime(&bases, 96, &mut ChaCha20Rng::seed_from_u64(9), None).unwrap();
        let b = pseudo_prime(&bases, 96, &mut ChaCha20Rng::seed_from_u64(9), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pseudo_prime_attempt_limit() {
        // 2-bit odd candidates are 1 or 3; base 3 rejects both
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let err = pseudo_prime(&[3], 2, &mut rng, Some(10)).unwrap_err();
        assert_eq!(err, PrimeError::SearchExhausted(10));
    }
}
