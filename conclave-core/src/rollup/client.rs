//! Rollup server seam.

use thiserror::Error;

use crate::rollup::types::{FinishStatus, RollupRequest};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RollupError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Unparseable server response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, RollupError>;

/// Connection to the rollup HTTP server.
///
/// `finish` reports the outcome of the previous request and blocks until the
/// next one is available; `Ok(None)` means the server had nothing pending.
pub trait RollupClient {
    fn finish(&mut self, status: FinishStatus) -> Result<Option<RollupRequest>>;
    fn send_notice(&mut self, payload: &str) -> Result<()>;
    fn send_report(&mut self, payload: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

#[cfg(feature = "network")]
pub use http::HttpRollupClient;

#[cfg(feature = "network")]
mod http {
    use reqwest::blocking::{Client, Response};
    use reqwest::header::CONTENT_TYPE;
    use reqwest::StatusCode;
    use serde::Serialize;

    use super::{Result, RollupClient, RollupError};
    use crate::rollup::types::{FinishRequest, FinishStatus, PayloadBody, RollupRequest};

    pub struct HttpRollupClient {
        base: String,
        client: Client,
    }

    impl HttpRollupClient {
        pub fn new(base: impl Into<String>) -> Result<Self> {
            // /finish long-polls, so no request timeout
            let client = Client::builder()
                .timeout(None::<std::time::Duration>)
                .build()
                .map_err(|e| RollupError::Transport(e.to_string()))?;
            Ok(HttpRollupClient {
                base: base.into().trim_end_matches('/').to_string(),
                client,
            })
        }

        pub fn base(&self) -> &str {
            &self.base
        }

        fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
            let url = format!("{}/{}", self.base, path);
            let bytes = serde_json::to_vec(body)
                .map_err(|e| RollupError::InvalidResponse(e.to_string()))?;
            self.client
                .post(&url)
                .header(CONTENT_TYPE, "application/json")
                .body(bytes)
                .send()
                .map_err(|e| RollupError::Transport(e.to_string()))
        }

        fn expect_success(resp: Response) -> Result<Response> {
            let status = resp.status();
            if status.is_success() {
                Ok(resp)
            } else {
                let body = resp.text().unwrap_or_default();
                Err(RollupError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    impl RollupClient for HttpRollupClient {
        fn finish(&mut self, status: FinishStatus) -> Result<Option<RollupRequest>> {
            log::debug!("Sending finish ({:?})", status);
            let resp = self.post_json("finish", &FinishRequest { status })?;
            if resp.status() == StatusCode::ACCEPTED {
                return Ok(None);
            }
            let resp = Self::expect_success(resp)?;
            let text = resp
                .text()
                .map_err(|e| RollupError::Transport(e.to_string()))?;
            serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| RollupError::InvalidResponse(e.to_string()))
        }

        fn send_notice(&mut self, payload: &str) -> Result<()> {
            let resp = self.post_json("notice", &PayloadBody { payload: payload.to_string() })?;
            Self::expect_success(resp).map(|_| ())
        }

        fn send_report(&mut self, payload: &str) -> Result<()> {
            let resp = self.post_json("report", &PayloadBody { payload: payload.to_string() })?;
            Self::expect_success(resp).map(|_| ())
        }
    }

}
