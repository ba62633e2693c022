/// Signature verification capability injected into the session store.
///
/// The store never interprets identities or signatures itself; it asks a
/// `SignatureVerifier` whether `signature` over `message` was produced by the
/// holder of `identity`.

use crate::crypto::rsa::{self, PublicKey};
use crate::encoding;
use crate::session::ids::Identity;

pub trait SignatureVerifier {
    fn verify(&self, message: &str, identity: &Identity, signature: &str) -> bool;
}

impl<F> SignatureVerifier for F
where
    F: Fn(&str, &Identity, &str) -> bool,
{
    fn verify(&self, message: &str, identity: &Identity, signature: &str) -> bool {
        self(message, identity, signature)
    }
}

/// Identities are marshalled RSA public keys (`N.E`); signatures are base64
/// textbook-RSA signatures over SHA-256(message).
#[derive(Clone, Copy, Debug, Default)]
pub struct RsaIdentityVerifier;

impl SignatureVerifier for RsaIdentityVerifier {
    fn verify(&self, message: &str, identity: &Identity, signature: &str) -> bool {
        let public = match PublicKey::unmarshal(identity.as_str()) {
            Ok(pk) => pk,
            Err(e) => {
                log::debug!("Identity is not an RSA public key: {}", e);
                return false;
            }
        };
        let sig = match encoding::b64_to_bytes(signature) {
            Ok(s) if !s.is_empty() => s,
            _ => return false,
        };
        rsa::verify_message(message.as_bytes(), &sig, &public)
    }
}

/// Accepts every signature. For hosts whose transport already authenticates
/// the sender identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct SenderAuthenticated;

impl SignatureVerifier for SenderAuthenticated {
    fn verify(&self, _message: &str, _identity: &Identity, _signature: &str) -> bool {
        true
    }
}

/// Produce the signature [`RsaIdentityVerifier`] accepts for `message`.
pub fn sign_for_identity(message: &str, keys: &rsa::RsaKeys) -> rsa::Result<String> {
    let sig = rsa::sign_message(message.as_bytes(), keys)?;
    Ok(encoding::bytes_to_b64(&sig))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::rsa::{generate_keys, RsaError, RsaKeys, RsaParams};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn keys(seed: u64) -> RsaKeys {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let params = RsaParams {
            prime_bits: 192,
            ..RsaParams::default()
        };
        loop {
            match generate_keys(&mut rng, &params) {
                Ok(k) => return k,
                Err(RsaError::NoInverse) => continue,
                Err(e) => panic!("{e}"),
            }
        }
    }

    #[test]
    fn test_rsa_identity_accepts_valid() {
        let k = keys(21);
        let identity = Identity::new(k.public_key().marshal());
        let sig = sign_for_identity("AQAB", &k).unwrap();
        assert!(RsaIdentityVerifier.verify("AQAB", &identity, &sig));
    }

    #[test]
    fn test_rsa_identity_rejects_other_key() {
        let k1 = keys(22);
        let k2 = keys(23);
        let sig = sign_for_identity("AQAB", &k1).unwrap();
        let other = Identity::new(k2.public_key().marshal());
        assert!(!RsaIdentityVerifier.verify("AQAB", &other, &sig));
    }

    #[test]
    fn test_rsa_identity_rejects_garbage() {
        let k = keys(24);
        let identity = Identity::new(k.public_key().marshal());
        assert!(!RsaIdentityVerifier.verify("AQAB", &identity, ""));
        assert!(!RsaIdentityVerifier.verify("AQAB", &identity, "not base64!"));
        assert!(!RsaIdentityVerifier.verify("AQAB", &Identity::from("0xabc"), "AQAB"));
    }

    #[test]
    fn test_sender_authenticated_accepts_all() {
        assert!(SenderAuthenticated.verify("x", &Identity::from("a"), ""));
    }

    #[test]
    fn test_closure_verifier() {
        let v = |_: &str, id: &Identity, sig: &str| sig == id.as_str();
        assert!(v.verify("m", &Identity::from("a"), "a"));
        assert!(!v.verify("m", &Identity::from("a"), "b"));
    }
}
