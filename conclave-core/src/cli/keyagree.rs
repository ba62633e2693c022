//! `generate`, `get-r2` and `get-secret`.

use rand::Rng;

use conclave_protocol::crypto::{burmester_desmedt as bd, dh, DhKeyPair};
use conclave_protocol::encoding;

use super::Result;

/// New key pair: first line the marshalled key, second line its round-1 value.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, bits: u64) -> Result<String> {
    let key = dh::generate_key_pair_with_bits(rng, dh::group(), bits)?;
    Ok(format!("{}\n{}", key.marshal(), key.public_b64()))
}

pub fn get_r2(key: &str, index: usize, r1s: &str) -> Result<String> {
    let key = DhKeyPair::unmarshal(key)?;
    let r1 = encoding::split_b64(r1s)?;
    let z = bd::round2(dh::group(), index, &key, &r1)?;
    Ok(encoding::biguint_to_b64(&z))
}

pub fn get_secret(key: &str, index: usize, r1s: &str, r2s: &str) -> Result<String> {
    let key = DhKeyPair::unmarshal(key)?;
    let r1 = encoding::split_b64(r1s)?;
    let r2 = encoding::split_b64(r2s)?;
    let secret = bd::shared_secret(dh::group(), index, &key, &r1, &r2)?;
    Ok(encoding::biguint_to_b64(&secret))
}
