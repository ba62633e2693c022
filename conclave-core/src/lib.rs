// Crate-level lint configuration.
#![allow(
    clippy::empty_line_after_doc_comments,
    clippy::doc_lazy_continuation,
    clippy::too_many_arguments,
    clippy::type_complexity,
    dead_code
)]

// ── Re-export Conclave Protocol modules ─────────────────────────────────────
pub use conclave_protocol::crypto;
pub use conclave_protocol::encoding;
pub use conclave_protocol::session;

// ── Local modules (app-layer, not part of the protocol library) ─────────────
pub mod cli;
pub mod config;
pub mod rollup;

// ── Re-export main types ────────────────────────────────────────────────────
pub use config::{ConfigError, NodeConfig, SignatureScheme};
pub use rollup::{DappHandler, FinishStatus, HandlerError, RollupClient, Runner, StepOutcome};
pub use session::{Action, Identity, Query, SessionId, SessionStore};

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version
pub fn get_version() -> &'static str {
    VERSION
}

/// Install the `env_logger` backend for the `log` facade.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` with
/// `verbose` (or the `debug-logs` feature).
pub fn init_logging(verbose: bool) {
    let level = if verbose || cfg!(feature = "debug-logs") {
        "debug"
    } else {
        "info"
    };
    let env = env_logger::Env::default().default_filter_or(level);
    // a second init (tests, embedding hosts) keeps the first logger
    let _ = env_logger::Builder::from_env(env).try_init();
}
