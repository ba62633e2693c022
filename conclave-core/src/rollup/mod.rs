/// Rollup adapter: drives the session store from a rollup HTTP server.
///
/// # Module structure
/// - `payload`: `0x` hex payload codec
/// - `types`: finish/advance/inspect/notice/report wire types
/// - `client`: RollupClient seam and the HTTP implementation
/// - `handler`: DappHandler: request → action/query → outputs
/// - `runner`: finish → handle → publish loop
pub mod client;
pub mod handler;
pub mod payload;
pub mod runner;
pub mod types;

pub use client::{RollupClient, RollupError};
#[cfg(feature = "network")]
pub use client::HttpRollupClient;
pub use handler::{DappHandler, HandlerError};
pub use runner::{Runner, StepOutcome};
pub use types::{FinishStatus, Output, RollupRequest};
