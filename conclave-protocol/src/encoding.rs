//! Text encoding shared by every wire format in the protocol: big integers are
//! carried as standard base64 of their minimal big-endian bytes, and lists of
//! integers (or key fields) are joined with `.`.

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use num_bigint::BigUint;
use num_traits::Zero;
use thiserror::Error;

/// Separator between base64 fields in marshalled keys and value lists.
pub const DELIMITER: char = '.';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Invalid base64: {0}")]
    InvalidBase64(String),
    #[error("Expected {expected} fields, got {got}")]
    FieldCount { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, EncodingError>;

/// Minimal big-endian bytes; zero encodes as an empty slice.
pub fn biguint_to_bytes(n: &BigUint) -> Vec<u8> {
    if n.is_zero() {
        Vec::new()
    } else {
        n.to_bytes_be()
    }
}

pub fn biguint_to_b64(n: &BigUint) -> String {
    B64.encode(biguint_to_bytes(n))
}

pub fn bytes_to_b64(bytes: &[u8]) -> String {
    B64.encode(bytes)
}

pub fn b64_to_bytes(s: &str) -> Result<Vec<u8>> {
    B64.decode(s.trim())
        .map_err(|e| EncodingError::InvalidBase64(e.to_string()))
}

pub fn b64_to_biguint(s: &str) -> Result<BigUint> {
    Ok(BigUint::from_bytes_be(&b64_to_bytes(s)?))
}

/// Encode a list of integers as `b64.b64.b64`.
pub fn join_b64(values: &[BigUint]) -> String {
    values
        .iter()
        .map(biguint_to_b64)
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string())
}

/// Decode a `.`-joined list of base64 integers.
pub fn split_b64(s: &str) -> Result<Vec<BigUint>> {
    s.trim().split(DELIMITER).map(b64_to_biguint).collect()
}

/// Decode exactly `expected` `.`-joined base64 integers.
pub fn split_b64_exact(s: &str, expected: usize) -> Result<Vec<BigUint>> {
    let values = split_b64(s)?;
    if values.len() != expected {
        return Err(EncodingError::FieldCount {
            expected,
            got: values.len(),
        });
    }
    Ok(values)
}
