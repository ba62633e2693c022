//! Modular arithmetic kernel.
//!
//! Every other component (prime search, RSA, Diffie–Hellman, Burmester–Desmedt)
//! funnels its big-integer work through these functions so that the zero-modulus
//! and non-invertible cases are reported as errors instead of panics.

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    #[error("Modulus must be non-zero")]
    ZeroModulus,
    #[error("No modular inverse exists (operands are not coprime)")]
    NoInverse,
}

pub type Result<T> = std::result::Result<T, MathError>;

/// `base^exponent mod modulus`.
pub fn modpow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(MathError::ZeroModulus);
    }
    Ok(base.modpow(exponent, modulus))
}

/// `a * b mod modulus`.
pub fn mulmod(a: &BigUint, b: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(MathError::ZeroModulus);
    }
    Ok((a * b) % modulus)
}

/// Multiplicative inverse of `a` modulo `modulus` via the extended Euclidean
/// algorithm.
///
/// # Returns
/// `x` in `[0, modulus)` with `a * x ≡ 1 (mod modulus)`, or
/// [`MathError::NoInverse`] when `gcd(a, modulus) != 1`.
pub fn modinv(a: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(MathError::ZeroModulus);
    }

    let m = BigInt::from_biguint(Sign::Plus, modulus.clone());
    let mut old_r = BigInt::from_biguint(Sign::Plus, a % modulus);
    let mut r = m.clone();
    let mut old_s = BigInt::one();
    let mut s = BigInt::zero();

    while !r.is_zero() {
        let (q, rem) = old_r.div_rem(&r);
        old_r = std::mem::replace(&mut r, rem);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    // old_r holds gcd(a, modulus); modulus == 1 is the degenerate ring where 0 is the inverse
    if !old_r.is_one() && !modulus.is_one() {
        return Err(MathError::NoInverse);
    }

    let inv = old_s.mod_floor(&m);
    // mod_floor against a positive modulus is never negative
    Ok(inv.to_biguint().unwrap_or_default())
}

/// `base^exponent mod modulus` for a signed exponent.
///
/// A negative exponent raises the modular inverse of `base` to `|exponent|`,
/// so it fails with [`MathError::NoInverse`] when `base` is not a unit.
pub fn modpow_signed(base: &BigUint, exponent: &BigInt, modulus: &BigUint) -> Result<BigUint> {
    let magnitude = exponent.magnitude();
    if exponent.is_negative() {
        let inv = modinv(base, modulus)?;
        modpow(&inv, magnitude, modulus)
    } else {
        modpow(base, magnitude, modulus)
    }
}
