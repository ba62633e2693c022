//! `rsa-generate`, `rsa-sign` and `rsa-verify`.

use rand::Rng;

use conclave_protocol::crypto::rsa::{self, PublicKey, RsaError, RsaKeys, RsaParams};
use conclave_protocol::encoding;
use conclave_protocol::session::sign_for_identity;

use super::Result;

/// Retries on `NoInverse` up to this many prime pairs.
const MAX_KEYGEN_ROUNDS: usize = 16;

/// Key set on the first line, public key on the second.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, params: &RsaParams) -> Result<String> {
    let mut rounds = 0;
    let keys = loop {
        rounds += 1;
        match rsa::generate_keys(rng, params) {
            Ok(k) => break k,
            Err(RsaError::NoInverse) if rounds < MAX_KEYGEN_ROUNDS => {
                log::debug!("E not invertible mod phi(N), drawing new primes");
            }
            Err(e) => return Err(e.into()),
        }
    };
    Ok(format!("{}\n{}", keys.marshal(), keys.public_key().marshal()))
}

pub fn sign(keys: &str, message: &str) -> Result<String> {
    let keys = RsaKeys::unmarshal(keys)?;
    Ok(sign_for_identity(message, &keys)?)
}

pub fn verify(public: &str, message: &str, signature: &str) -> Result<String> {
    let public = PublicKey::unmarshal(public)?;
    let sig = encoding::b64_to_bytes(signature)?;
    let ok = rsa::verify_message(message.as_bytes(), &sig, &public);
    Ok(if ok { "valid" } else { "invalid" }.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{rng_from_seed, CliError};

    fn small_params() -> RsaParams {
        RsaParams {
            prime_bits: 192,
            ..RsaParams::default()
        }
    }

    fn key_lines(seed: u64) -> (String, String) {
        let out = generate(&mut rng_from_seed(Some(seed)), &small_params()).unwrap();
        let (keys, public) = out.split_once('\n').unwrap();
        (keys.to_string(), public.to_string())
    }

    #[test]
    fn test_generate_output() {
        let (keys, public) = key_lines(3);
        let parsed = RsaKeys::unmarshal(&keys).unwrap();
        assert_eq!(parsed.public_key().marshal(), public);
    }

    #[test]
    fn test_sign_then_verify() {
        let (keys, public) = key_lines(4);
        let sig = sign(&keys, "AQAB").unwrap();
        assert_eq!(verify(&public, "AQAB", &sig).unwrap(), "valid");
        assert_eq!(verify(&public, "AQAC", &sig).unwrap(), "invalid");
    }

    #[test]
    fn test_bad_inputs() {
        assert!(matches!(sign("AQAB", "m"), Err(CliError::Rsa(_))));
        let (_, public) = key_lines(5);
        assert!(matches!(verify(&public, "m", "@@"), Err(CliError::Encoding(_))));
    }

    #[test]
    fn test_exhausted_search_reported() {
        let params = RsaParams {
            prime_bits: 2,
            sieve_limit: 4,
            max_prime_attempts: Some(5),
        };
        assert!(matches!(
            generate(&mut rng_from_seed(Some(1)), &params),
            Err(CliError::Rsa(RsaError::PrimeSearch(_)))
        ));
    }
}
