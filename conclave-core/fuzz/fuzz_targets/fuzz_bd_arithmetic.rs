#![no_main]
use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;

use conclave::crypto::{burmester_desmedt as bd, dh, DhKeyPair};
use num_bigint::BigUint;

/// Fuzz Burmester–Desmedt with attacker-chosen broadcast values.
///
/// Round 2 and reconstruction must reject or compute, never panic.
#[derive(Arbitrary, Debug)]
struct BdInput {
    exponent: Vec<u8>,
    index: u8,
    r1: Vec<Vec<u8>>,
    r2: Vec<Vec<u8>>,
}

fuzz_target!(|input: BdInput| {
    // Bound the work per iteration
    if input.r1.len() > 8 || input.r2.len() > 8 || input.exponent.len() > 64 {
        return;
    }

    let gr = dh::group();
    let a = BigUint::from_bytes_be(&input.exponent);
    let key = DhKeyPair {
        ga: gr.g.modpow(&a, &gr.p),
        a,
    };
    let r1: Vec<BigUint> = input.r1.iter().map(|v| BigUint::from_bytes_be(v)).collect();
    let r2: Vec<BigUint> = input.r2.iter().map(|v| BigUint::from_bytes_be(v)).collect();
    let index = input.index as usize;

    let _ = bd::round2(gr, index, &key, &r1);
    let _ = bd::shared_secret(gr, index, &key, &r1, &r2);
});
