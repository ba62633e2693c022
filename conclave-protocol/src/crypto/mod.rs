pub mod burmester_desmedt;
pub mod dh;
pub mod prime;
pub mod rsa;

pub use burmester_desmedt::{round1, round2, BdError};
pub use dh::{
    generate_key_pair, generate_key_pair_with_bits, group, shared_secret, DhError, DhGroup,
    DhKeyPair, DH_EXPONENT_BITS,
};
pub use prime::{fermat_test, pseudo_prime, sieve, PrimeError};
pub use rsa::{
    decrypt_chunk, encrypt_chunk, generate_keys, sign_chunk, sign_message, verify_message,
    verify_signature, PublicKey, RsaError, RsaKeys, RsaParams, PUBLIC_EXPONENT,
};
