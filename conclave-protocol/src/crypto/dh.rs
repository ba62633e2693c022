//! Diffie–Hellman over a fixed 2048-bit MODP group.
//!
//! The group is RFC 3526 group 14 (safe prime `p`, generator 2). Private
//! exponents are random odd integers of [`DH_EXPONENT_BITS`] bits.

use std::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;
use rand::Rng;
use thiserror::Error;

use crate::crypto::prime;
use crate::encoding::{self, EncodingError};
use crate::math::{self, MathError};

/// Bit size of private exponents.
pub const DH_EXPONENT_BITS: u64 = 512;

const MODP_2048_HEX: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1",
    "29024E088A67CC74020BBEA63B139B22514A08798E3404DD",
    "EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245",
    "E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D",
    "C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F",
    "83655D23DCA3AD961C62F356208552BB9ED529077096966D",
    "670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9",
    "DE2BCBF6955817183995497CEA956AE515D2261898FA0510",
    "15728E5A8AACAA68FFFFFFFFFFFFFFFF",
);

static GROUP: Lazy<DhGroup> = Lazy::new(|| DhGroup {
    p: BigUint::parse_bytes(MODP_2048_HEX.as_bytes(), 16).unwrap_or_default(),
    g: BigUint::from(2u32),
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DhError {
    #[error("Public value is outside [1, p-1]")]
    InvalidPublicValue,
    #[error("Invalid key encoding: {0}")]
    InvalidEncoding(#[from] EncodingError),
    #[error("Arithmetic error: {0}")]
    Math(#[from] MathError),
}

pub type Result<T> = std::result::Result<T, DhError>;

/// Modulus and generator. Immutable, shared process-wide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DhGroup {
    pub p: BigUint,
    pub g: BigUint,
}

/// The fixed protocol group.
pub fn group() -> &'static DhGroup {
    &GROUP
}

impl DhGroup {
    /// True iff `v` lies in `[1, p-1]`.
    pub fn contains(&self, v: &BigUint) -> bool {
        !v.is_zero() && v < &self.p
    }
}

/// Private exponent `a` and public value `ga = g^a mod p`.
#[derive(Clone, PartialEq, Eq)]
pub struct DhKeyPair {
    pub a: BigUint,
    pub ga: BigUint,
}

impl fmt::Debug for DhKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DhKeyPair")
            .field("a", &"<private>")
            .field("ga", &encoding::biguint_to_b64(&self.ga))
            .finish()
    }
}

impl DhKeyPair {
    /// Public value, base64.
    pub fn public_b64(&self) -> String {
        encoding::biguint_to_b64(&self.ga)
    }

    /// `a.ga`, each field base64.
    pub fn marshal(&self) -> String {
        encoding::join_b64(&[self.a.clone(), self.ga.clone()])
    }

    pub fn unmarshal(s: &str) -> Result<Self> {
        let mut fields = encoding::split_b64_exact(s, 2)?.into_iter();
        let a = fields.next().unwrap_or_default();
        let ga = fields.next().unwrap_or_default();
        Ok(DhKeyPair { a, ga })
    }
}

pub fn generate_key_pair<R: Rng + ?Sized>(rng: &mut R, group: &DhGroup) -> Result<DhKeyPair> {
    generate_key_pair_with_bits(rng, group, DH_EXPONENT_BITS)
}

/// Key pair whose private exponent is a random odd integer of at most `bits`
/// bits, reduced mod `p`.
pub fn generate_key_pair_with_bits<R: Rng + ?Sized>(
    rng: &mut R,
    group: &DhGroup,
    bits: u64,
) -> Result<DhKeyPair> {
    if group.p.is_zero() {
        return Err(MathError::ZeroModulus.into());
    }
    let mut a = prime::random_odd_candidate(rng, bits) % &group.p;
    if a.is_zero() {
        a = BigUint::one();
    }
    let ga = math::modpow(&group.g, &a, &group.p)?;
    log::debug!("Generated DH key pair ({}-bit exponent)", a.bits());
    Ok(DhKeyPair { a, ga })
}

/// `peer^a mod p`.
pub fn shared_secret(group: &DhGroup, own: &DhKeyPair, peer: &BigUint) -> Result<BigUint> {
    if !group.contains(peer) {
        return Err(DhError::InvalidPublicValue);
    }
    Ok(math::modpow(peer, &own.a, &group.p)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_integer::Integer;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_group_constant() {
        let g = group();
        assert_eq!(g.p.bits(), 2048);
        assert_eq!(g.g, BigUint::from(2u32));
        assert!(g.p.is_odd());
        // g^(p-1) = 1 for prime p
        let e = &g.p - 1u32;
        assert!(g.g.modpow(&e, &g.p).is_one());
    }

    #[test]
    fn test_group_is_safe_prime() {
        let p = &group().p;
        let q = (p - 1u32) >> 1;
        assert!(prime::fermat_test(3, &q));
    }

    #[test]
    fn test_key_pair_shape() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let kp = generate_key_pair(&mut rng, group()).unwrap();
        assert!(kp.a.is_odd());
        assert!(kp.a.bits() <= DH_EXPONENT_BITS);
        assert_eq!(kp.ga, group().g.modpow(&kp.a, &group().p));
        assert!(group().contains(&kp.ga));
    }

    #[test]
    fn test_shared_secret_symmetry() {
        let mut rng = ChaCha20Rng::seed_from_u64(12);
        for _ in 0..4 {
            let k1 = generate_key_pair(&mut rng, group()).unwrap();
            let k2 = generate_key_pair(&mut rng, group()).unwrap();
            let s1 = shared_secret(group(), &k1, &k2.ga).unwrap();
            let s2 = shared_secret(group(), &k2, &k1.ga).unwrap();
            assert_eq!(s1, s2);
        }
    }

    #[test]
    fn test_shared_secret_rejects_out_of_group() {
        let mut rng = ChaCha20Rng::seed_from_u64(13);
        let kp = generate_key_pair(&mut rng, group()).unwrap();
        assert_eq!(
            shared_secret(group(), &kp, &BigUint::zero()),
            Err(DhError::InvalidPublicValue)
        );
        assert_eq!(
            shared_secret(group(), &kp, &group().p),
            Err(DhError::InvalidPublicValue)
        );
    }

    #[test]
    fn test_small_exponent_bits() {
        let mut rng = ChaCha20Rng::seed_from_u64(14);
        let kp = generate_key_pair_with_bits(&mut rng, group(), 16).unwrap();
        assert!(kp.a.bits() <= 16);
    }

    #[test]
    fn test_marshal_roundtrip() {
        let mut rng = ChaCha20Rng::seed_from_u64(15);
        let kp = generate_key_pair(&mut rng, group()).unwrap();
        let s = kp.marshal();
        assert_eq!(DhKeyPair::unmarshal(&s).unwrap(), kp);
        assert!(s.ends_with(&kp.public_b64()));
        assert!(DhKeyPair::unmarshal("AQAB").is_err());
    }

    #[test]
    fn test_debug_hides_exponent() {
        let kp = DhKeyPair {
            a: BigUint::from(0xdead_beefu32),
            ga: BigUint::from(5u32),
        };
        let dbg = format!("{:?}", kp);
        assert!(dbg.contains("<private>"));
        assert!(!dbg.contains("3735928559"));
    }
}
