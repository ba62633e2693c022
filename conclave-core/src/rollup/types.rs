//! Rollup HTTP server wire types.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishStatus {
    #[default]
    Accept,
    Reject,
}

/// Body of `POST /finish`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishRequest {
    pub status: FinishStatus,
}

/// Pending request returned by `/finish`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request_type", content = "data", rename_all = "snake_case")]
pub enum RollupRequest {
    AdvanceState(AdvanceRequest),
    InspectState(InspectRequest),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceRequest {
    pub metadata: AdvanceMetadata,
    pub payload: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceMetadata {
    pub msg_sender: String,
    #[serde(default)]
    pub epoch_index: u64,
    #[serde(default)]
    pub input_index: u64,
    #[serde(default)]
    pub block_number: u64,
    #[serde(default)]
    pub timestamp: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectRequest {
    pub payload: String,
}

/// Body of `POST /notice` and `POST /report`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadBody {
    pub payload: String,
}

/// Output produced by the handler, as JSON text before hex encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    Notice(String),
    Report(String),
}
