/// Typed inbound requests.
///
/// Actions mutate the session store; queries only read it. Both arrive as JSON
/// objects discriminated by a `method` field and are validated once here, so
/// the store only ever sees well-typed input.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encoding;
use crate::session::ids::{Identity, SessionId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The payload is not JSON at all.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Valid JSON with the wrong shape for its method.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, RequestError>;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum Action {
    CreateGroup {
        members: Vec<Identity>,
    },
    SubmitR1 {
        id: SessionId,
        #[serde(rename = "r1Value")]
        r1_value: String,
        #[serde(default)]
        signature: String,
    },
    SubmitR2 {
        id: SessionId,
        #[serde(rename = "r2Value")]
        r2_value: String,
        #[serde(default)]
        signature: String,
    },
    SubmitGroupAddress {
        id: SessionId,
        #[serde(rename = "groupAddress")]
        group_address: String,
        #[serde(default)]
        signature: String,
    },
    SubmitTransition {
        id: SessionId,
        action: String,
    },
    /// Any other method. Ignored.
    #[serde(other)]
    Unknown,
}

impl Action {
    pub fn from_json(json: &str) -> Result<Self> {
        parse_tagged(json)
    }

    pub fn method(&self) -> &'static str {
        match self {
            Action::CreateGroup { .. } => "CreateGroup",
            Action::SubmitR1 { .. } => "SubmitR1",
            Action::SubmitR2 { .. } => "SubmitR2",
            Action::SubmitGroupAddress { .. } => "SubmitGroupAddress",
            Action::SubmitTransition { .. } => "SubmitTransition",
            Action::Unknown => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Query {
    Groups,
    Transitions {
        id: SessionId,
    },
    #[serde(other)]
    Unknown,
}

impl Query {
    pub fn from_json(json: &str) -> Result<Self> {
        parse_tagged(json)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Two-stage parse: syntax errors are `Decode`, shape errors `InvalidInput`.
fn parse_tagged<T: serde::de::DeserializeOwned>(json: &str) -> Result<T> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| RequestError::Decode(e.to_string()))?;
    if !value.is_object() {
        return Err(RequestError::InvalidInput("request must be a JSON object".into()));
    }
    serde_json::from_value(value).map_err(|e| RequestError::InvalidInput(e.to_string()))
}

/// Decode a base64 round value carried in a request.
pub fn parse_value(b64: &str) -> Result<BigUint> {
    if b64.trim().is_empty() {
        return Err(RequestError::InvalidInput("round value is empty".into()));
    }
    encoding::b64_to_biguint(b64).map_err(|e| RequestError::InvalidInput(e.to_string()))
}
