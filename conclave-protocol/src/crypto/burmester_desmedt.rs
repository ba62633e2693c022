//! Burmester–Desmedt conference key agreement.
//!
//! `n` participants sit on a ring `0..n-1`; all neighbour arithmetic is mod
//! `n`. Round 1 broadcasts `r1[i] = g^{a_i}`, round 2 broadcasts
//! `z_i = (r1[i+1] / r1[i-1])^{a_i}`, and every participant reconstructs
//! `K = g^{a_0 a_1 + a_1 a_2 + ... + a_{n-1} a_0} mod p`.

use num_bigint::{BigInt, BigUint};
use thiserror::Error;

use crate::crypto::dh::{DhGroup, DhKeyPair};
use crate::math::{self, MathError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BdError {
    #[error("At least two participants are required, got {0}")]
    TooFewParticipants(usize),
    #[error("Participant index {index} out of range for {count} participants")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("Round vectors differ in length: r1 has {r1}, r2 has {r2}")]
    LengthMismatch { r1: usize, r2: usize },
    #[error("Value at position {0} is outside [1, p-1]")]
    InvalidValue(usize),
    #[error("Neighbour value has no inverse modulo p")]
    NoInverse,
    #[error("Arithmetic error: {0}")]
    Math(MathError),
}

impl From<MathError> for BdError {
    fn from(e: MathError) -> Self {
        match e {
            MathError::NoInverse => BdError::NoInverse,
            other => BdError::Math(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, BdError>;

fn prev(index: usize, count: usize) -> usize {
    (index + count - 1) % count
}

fn next(index: usize, count: usize) -> usize {
    (index + 1) % count
}

fn check_ring(group: &DhGroup, index: usize, values: &[BigUint]) -> Result<()> {
    let count = values.len();
    if count < 2 {
        return Err(BdError::TooFewParticipants(count));
    }
    if index >= count {
        return Err(BdError::IndexOutOfRange { index, count });
    }
    if let Some(pos) = values.iter().position(|v| !group.contains(v)) {
        return Err(BdError::InvalidValue(pos));
    }
    Ok(())
}

/// Round-1 broadcast: the participant's DH public value.
pub fn round1(key: &DhKeyPair) -> BigUint {
    key.ga.clone()
}

/// Round-2 broadcast of participant `index`:
/// `(r1[i+1] · r1[i-1]^{-1})^{a_i} mod p`.
pub fn round2(group: &DhGroup, index: usize, key: &DhKeyPair, r1: &[BigUint]) -> Result<BigUint> {
    check_ring(group, index, r1)?;
    let count = r1.len();
    let p = &group.p;

    let prev_inv = math::modpow_signed(&r1[prev(index, count)], &BigInt::from(-1), p)?;
    let ratio = math::mulmod(&r1[next(index, count)], &prev_inv, p)?;
    Ok(math::modpow(&ratio, &key.a, p)?)
}

/// Group secret as seen by participant `index`:
/// `r1[i-1]^{n·a_i} · Π_{j=0}^{n-2} r2[(i+j) mod n]^{n-1-j} mod p`.
pub fn shared_secret(
    group: &DhGroup,
    index: usize,
    key: &DhKeyPair,
    r1: &[BigUint],
    r2: &[BigUint],
) -> Result<BigUint> {
    if r1.len() != r2.len() {
        return Err(BdError::LengthMismatch {
            r1: r1.len(),
            r2: r2.len(),
        });
    }
    check_ring(group, index, r1)?;
    check_ring(group, index, r2)?;

    let count = r1.len();
    let p = &group.p;

    let exponent = BigUint::from(count) * &key.a;
    let mut k = math::modpow(&r1[prev(index, count)], &exponent, p)?;

    for j in 0..count - 1 {
        let power = BigUint::from(count - 1 - j);
        let term = math::modpow(&r2[(index + j) % count], &power, p)?;
        k = math::mulmod(&k, &term, p)?;
    }

    log::debug!("Reconstructed group secret for participant {} of {}", index, count);
    Ok(k)
}
