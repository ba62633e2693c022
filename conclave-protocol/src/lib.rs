//! # Conclave Protocol
//!
//! **Group key agreement for rollup applications.**
//!
//! Conclave lets `n` parties agree on one shared secret by publishing two rounds
//! of values through an untrusted, replicated log. It provides:
//!
//! - **Burmester–Desmedt key agreement** over a fixed 2048-bit Diffie–Hellman group
//! - **Textbook RSA** with Fermat pseudo-prime generation, used for identity signatures
//! - **Group sessions** that gate round submissions by membership and signature
//!
//! ## Quick Start
//!
//! ```rust
//! use conclave_protocol::crypto::{dh, burmester_desmedt as bd};
//! use rand::SeedableRng;
//!
//! let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(1);
//! let gr = dh::group();
//! let keys: Vec<_> = (0..3).map(|_| dh::generate_key_pair(&mut rng, gr).unwrap()).collect();
//! let r1: Vec<_> = keys.iter().map(bd::round1).collect();
//! let r2: Vec<_> = keys.iter().enumerate()
//!     .map(|(i, k)| bd::round2(gr, i, k, &r1).unwrap())
//!     .collect();
//! let k0 = bd::shared_secret(gr, 0, &keys[0], &r1, &r2).unwrap();
//! let k2 = bd::shared_secret(gr, 2, &keys[2], &r1, &r2).unwrap();
//! assert_eq!(k0, k2);
//! ```
//!
//! ## Architecture
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`math`] | Modular exponentiation, multiplication and inversion |
//! | [`encoding`] | Base64 big-integer encoding and dot-joined lists |
//! | [`crypto`] | Prime generation, RSA, Diffie–Hellman, Burmester–Desmedt |
//! | [`session`] | Group session state machine, signature verification, requests |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `std` | Yes | Standard library support |
//! | `sessions` | Yes | Group session store and request types |

#![allow(
    clippy::empty_line_after_doc_comments,
    clippy::doc_lazy_continuation,
    clippy::too_many_arguments,
    clippy::type_complexity,
    clippy::needless_range_loop,
    dead_code
)]

// ── Public modules ──────────────────────────────────────────────────────────

/// Modular big-integer arithmetic.
pub mod math;

/// Base64 and list encodings shared by keys, CLI values and session slots.
pub mod encoding;

/// Prime generation, textbook RSA, Diffie–Hellman and Burmester–Desmedt.
pub mod crypto;

/// Group sessions: member ring, round slots, action log, request decoding.
#[cfg(feature = "sessions")]
pub mod session;

// ── Re-exports for convenience ──────────────────────────────────────────────

pub use crypto::{
    BdError, DhError, DhGroup, DhKeyPair, PrimeError, PublicKey, RsaError, RsaKeys, RsaParams,
};

pub use math::MathError;

pub use encoding::EncodingError;

#[cfg(feature = "sessions")]
pub use session::{
    Action, GroupSession, Identity, Query, RequestError, Round, SessionError, SessionId,
    SessionPhase, SessionPolicy, SessionStore, SignatureVerifier, SlotPolicy,
};

// ── Library metadata ────────────────────────────────────────────────────────

/// Conclave Protocol version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version string.
pub fn version() -> &'static str {
    VERSION
}

// ── Tests ───────────────────────────────────────────────────────────────────
