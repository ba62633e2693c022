#![no_main]
use libfuzzer_sys::fuzz_target;

use conclave::crypto::{DhKeyPair, PublicKey, RsaKeys};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    // Parsing arbitrary text must not panic; whatever parses must re-marshal
    // to something that parses back to the same value
    if let Ok(pk) = PublicKey::unmarshal(&text) {
        assert_eq!(PublicKey::unmarshal(&pk.marshal()).unwrap(), pk);
        let _ = pk.max_chunk_len();
        let _ = conclave::crypto::rsa::verify_signature(b"x", data, &pk);
    }
    if let Ok(keys) = RsaKeys::unmarshal(&text) {
        assert_eq!(RsaKeys::unmarshal(&keys.marshal()).unwrap(), keys);
    }
    if let Ok(kp) = DhKeyPair::unmarshal(&text) {
        assert_eq!(DhKeyPair::unmarshal(&kp.marshal()).unwrap(), kp);
    }
});
