//! Textbook RSA: key derivation from Fermat pseudo-primes, raw chunk
//! encryption/signing, and the dot-joined base64 key format.
//!
//! No padding and no hashing happens at the chunk level. Callers split their
//! input so every chunk, read as a big-endian integer, is below `N`
//! (`PublicKey::max_chunk_len` gives a safe size).

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::One;
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::crypto::prime::{self, PrimeError};
use crate::encoding::{self, EncodingError};
use crate::math::{self, MathError};

/// Fixed public exponent.
pub const PUBLIC_EXPONENT: u32 = 65_537;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RsaError {
    #[error("Public exponent has no inverse modulo phi(N); retry with new primes")]
    NoInverse,
    #[error("Prime search failed: {0}")]
    PrimeSearch(#[from] PrimeError),
    #[error("Invalid key encoding: {0}")]
    InvalidEncoding(#[from] EncodingError),
    #[error("Arithmetic error: {0}")]
    Math(MathError),
}

impl From<MathError> for RsaError {
    fn from(e: MathError) -> Self {
        match e {
            MathError::NoInverse => RsaError::NoInverse,
            other => RsaError::Math(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RsaError>;

/// Key generation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaParams {
    /// Bit size of each of `P` and `Q`.
    pub prime_bits: u64,
    /// Fermat bases are the primes below this limit.
    pub sieve_limit: u32,
    /// Candidate budget per prime; `None` searches without bound.
    pub max_prime_attempts: Option<u64>,
}

impl Default for RsaParams {
    fn default() -> Self {
        Self {
            prime_bits: prime::DEFAULT_PRIME_BITS,
            sieve_limit: prime::DEFAULT_SIEVE_LIMIT,
            max_prime_attempts: None,
        }
    }
}

/// Full key set. Owned by one party; only [`PublicKey`] leaves it.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaKeys {
    pub p: BigUint,
    pub q: BigUint,
    pub e: BigUint,
    pub d: BigUint,
    pub n: BigUint,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PublicKey {
    pub n: BigUint,
    pub e: BigUint,
}

impl fmt::Debug for RsaKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RsaKeys(n: {} bits, e: {}, <private>)", self.n.bits(), self.e)
    }
}

/// Derive a key set from two fresh pseudo-primes.
///
/// Fails with [`RsaError::NoInverse`] in the rare case that `E` divides `φ(N)`;
/// the caller retries with new primes.
pub fn generate_keys<R: Rng + ?Sized>(rng: &mut R, params: &RsaParams) -> Result<RsaKeys> {
    let bases = prime::sieve(params.sieve_limit);
    let p = prime::pseudo_prime(&bases, params.prime_bits, rng, params.max_prime_attempts)?;
    let q = prime::pseudo_prime(&bases, params.prime_bits, rng, params.max_prime_attempts)?;

    let n = &p * &q;
    let e = BigUint::from(PUBLIC_EXPONENT);
    let phi = (&p - BigUint::one()) * (&q - BigUint::one());
    let d = math::modinv(&e, &phi)?;

    log::info!("Generated RSA key set with {}-bit modulus", n.bits());

    Ok(RsaKeys { p, q, e, d, n })
}

impl RsaKeys {
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            n: self.n.clone(),
            e: self.e.clone(),
        }
    }

    /// `P.Q.E.D.N`, each field base64.
    pub fn marshal(&self) -> String {
        encoding::join_b64(&[
            self.p.clone(),
            self.q.clone(),
            self.e.clone(),
            self.d.clone(),
            self.n.clone(),
        ])
    }

    pub fn unmarshal(s: &str) -> Result<Self> {
        let mut fields = encoding::split_b64_exact(s, 5)?.into_iter();
        // split_b64_exact guarantees five fields
        let mut next = || fields.next().unwrap_or_default();
        Ok(RsaKeys {
            p: next(),
            q: next(),
            e: next(),
            d: next(),
            n: next(),
        })
    }
}

impl FromStr for RsaKeys {
    type Err = RsaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::unmarshal(s)
    }
}

impl PublicKey {
    /// `N.E`, each field base64.
    pub fn marshal(&self) -> String {
        encoding::join_b64(&[self.n.clone(), self.e.clone()])
    }

    pub fn unmarshal(s: &str) -> Result<Self> {
        let fields = encoding::split_b64_exact(s, 2)?;
        let [n, e]: [BigUint; 2] = fields
            .try_into()
            .map_err(|_| EncodingError::FieldCount { expected: 2, got: 0 })?;
        Ok(PublicKey { n, e })
    }

    /// Largest chunk length whose integer value is always below `N`.
    pub fn max_chunk_len(&self) -> usize {
        (self.n.bits().saturating_sub(1) / 8) as usize
    }
}

impl FromStr for PublicKey {
    type Err = RsaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::unmarshal(s)
    }
}

fn apply_exponent(chunk: &[u8], exponent: &BigUint, modulus: &BigUint) -> Result<Vec<u8>> {
    let m = BigUint::from_bytes_be(chunk);
    let c = math::modpow(&m, exponent, modulus)?;
    Ok(encoding::biguint_to_bytes(&c))
}

/// `chunk^E mod N`.
pub fn encrypt_chunk(chunk: &[u8], public: &PublicKey) -> Result<Vec<u8>> {
    apply_exponent(chunk, &public.e, &public.n)
}

/// `chunk^D mod N`.
pub fn decrypt_chunk(chunk: &[u8], keys: &RsaKeys) -> Result<Vec<u8>> {
    apply_exponent(chunk, &keys.d, &keys.n)
}

/// Signing is exponentiation with the private exponent.
pub fn sign_chunk(chunk: &[u8], keys: &RsaKeys) -> Result<Vec<u8>> {
    apply_exponent(chunk, &keys.d, &keys.n)
}

/// Re-encrypt `signature` with the public exponent and compare it byte for
/// byte with `chunk`.
pub fn verify_signature(chunk: &[u8], signature: &[u8], public: &PublicKey) -> bool {
    let recovered = match encrypt_chunk(signature, public) {
        Ok(r) => r,
        Err(_) => return false,
    };

    if recovered.len() != chunk.len() {
        return false;
    }

    recovered.ct_eq(chunk).into()
}

pub fn encrypt_chunk_b64(chunk: &[u8], public: &PublicKey) -> Result<String> {
    let enc = encrypt_chunk(chunk, public)?;
    Ok(encoding::bytes_to_b64(&enc))
}

pub fn decrypt_chunk_b64(ciphertext_b64: &str, keys: &RsaKeys) -> Result<Vec<u8>> {
    let bytes = encoding::b64_to_bytes(ciphertext_b64)?;
    decrypt_chunk(&bytes, keys)
}

pub fn sign_chunk_b64(chunk_b64: &str, keys: &RsaKeys) -> Result<Vec<u8>> {
    let bytes = encoding::b64_to_bytes(chunk_b64)?;
    sign_chunk(&bytes, keys)
}

/// Both arguments base64. Malformed base64 verifies as false.
pub fn verify_signature_b64(chunk_b64: &str, signature_b64: &str, public: &PublicKey) -> bool {
    match (
        encoding::b64_to_bytes(chunk_b64),
        encoding::b64_to_bytes(signature_b64),
    ) {
        (Ok(chunk), Ok(sig)) => verify_signature(&chunk, &sig, public),
        _ => false,
    }
}

// ── Message signatures ──────────────────────────────────────────────────────
//
// Arbitrary-length messages are signed through their SHA-256 digest so the
// signed integer always fits under N. The digest is taken as a minimal
// big-endian integer (leading zero bytes stripped) to match what
// `encrypt_chunk` recovers.

fn message_chunk(message: &[u8]) -> Vec<u8> {
    let digest = Sha256::digest(message);
    let start = digest.iter().position(|b| *b != 0).unwrap_or(digest.len());
    digest[start..].to_vec()
}

/// Textbook-RSA signature over SHA-256(message). Needs a modulus above 256 bits.
pub fn sign_message(message: &[u8], keys: &RsaKeys) -> Result<Vec<u8>> {
    sign_chunk(&message_chunk(message), keys)
}

pub fn verify_message(message: &[u8], signature: &[u8], public: &PublicKey) -> bool {
    verify_signature(&message_chunk(message), signature, public)
}
