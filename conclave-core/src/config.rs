//! Node configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. `ROLLUP_HTTP_SERVER_URL` overrides `rollup.server_url`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use conclave_protocol::crypto::{dh, prime, RsaParams};
use conclave_protocol::session::{
    RsaIdentityVerifier, SenderAuthenticated, SessionPolicy, SessionStore,
};

/// Environment variable naming the rollup HTTP server.
pub const SERVER_URL_ENV: &str = "ROLLUP_HTTP_SERVER_URL";

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5004";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub rollup: RollupConfig,
    pub session: SessionPolicy,
    pub signatures: SignatureConfig,
    pub keygen: KeygenConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollupConfig {
    pub server_url: String,
    /// Pause after a transport failure before polling again.
    pub retry_delay_secs: u64,
}

impl Default for RollupConfig {
    fn default() -> Self {
        RollupConfig {
            server_url: DEFAULT_SERVER_URL.to_string(),
            retry_delay_secs: 3,
        }
    }
}

impl RollupConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureScheme {
    /// Identities are marshalled RSA public keys. Only usable when the host
    /// delivers such keys as the sender identity.
    Rsa,
    /// The rollup already authenticates `msg_sender`; signatures are not checked.
    #[default]
    Sender,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    pub scheme: SignatureScheme,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeygenConfig {
    pub dh_exponent_bits: u64,
    pub rsa_prime_bits: u64,
    pub sieve_limit: u32,
    /// Candidate budget per prime; absent means unbounded.
    pub max_prime_attempts: Option<u64>,
}

impl Default for KeygenConfig {
    fn default() -> Self {
        KeygenConfig {
            dh_exponent_bits: dh::DH_EXPONENT_BITS,
            rsa_prime_bits: prime::DEFAULT_PRIME_BITS,
            sieve_limit: prime::DEFAULT_SIEVE_LIMIT,
            max_prime_attempts: None,
        }
    }
}

impl KeygenConfig {
    pub fn rsa_params(&self) -> RsaParams {
        RsaParams {
            prime_bits: self.rsa_prime_bits,
            sieve_limit: self.sieve_limit,
            max_prime_attempts: self.max_prime_attempts,
        }
    }
}

impl NodeConfig {
    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: NodeConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `path`, or defaults when `path` is `None`, then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => {
                log::info!("Loading config from {}", p.display());
                Self::from_toml(&fs::read_to_string(p)?)?
            }
            None => NodeConfig::default(),
        };
        cfg.apply_env_override(std::env::var(SERVER_URL_ENV).ok());
        Ok(cfg)
    }

    pub fn apply_env_override(&mut self, server_url: Option<String>) {
        if let Some(url) = server_url.filter(|u| !u.trim().is_empty()) {
            log::debug!("{} overrides rollup.server_url", SERVER_URL_ENV);
            self.rollup.server_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.keygen.dh_exponent_bits == 0 {
            return Err(ConfigError::Invalid("keygen.dh_exponent_bits must be positive".into()));
        }
        if self.keygen.rsa_prime_bits < 2 {
            return Err(ConfigError::Invalid("keygen.rsa_prime_bits must be at least 2".into()));
        }
        if self.keygen.sieve_limit < 3 {
            return Err(ConfigError::Invalid("keygen.sieve_limit must be at least 3".into()));
        }
        if self.rollup.server_url.trim().is_empty() {
            return Err(ConfigError::Invalid("rollup.server_url is empty".into()));
        }
        Ok(())
    }

    /// Session store wired with the configured policy and signature scheme.
    pub fn session_store(&self) -> SessionStore {
        match self.signatures.scheme {
            SignatureScheme::Rsa => SessionStore::new(self.session, RsaIdentityVerifier),
            SignatureScheme::Sender => {
                log::info!("Signature checks delegated to the rollup: trusting msg_sender");
                SessionStore::new(self.session, SenderAuthenticated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_protocol::session::SlotPolicy;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let cfg = NodeConfig::default();
        assert_eq!(cfg.rollup.server_url, DEFAULT_SERVER_URL);
        assert_eq!(cfg.rollup.retry_delay(), Duration::from_secs(3));
        assert_eq!(cfg.session.slot_policy, SlotPolicy::Overwrite);
        assert!(!cfg.session.enforce_round_order);
        assert_eq!(cfg.signatures.scheme, SignatureScheme::Sender);
        assert_eq!(cfg.keygen.rsa_params(), RsaParams::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(NodeConfig::from_toml("").unwrap(), NodeConfig::default());
    }

    #[test]
    fn test_parse_full() {
        let cfg = NodeConfig::from_toml(
            r#"
            [rollup]
            server_url = "http://rollup:5004"
            retry_delay_secs = 1

            [session]
            slot_policy = "write_once"
            enforce_round_order = true

            [signatures]
            scheme = "rsa"

            [keygen]
            dh_exponent_bits = 256
            rsa_prime_bits = 1024
            sieve_limit = 500
            max_prime_attempts = 100000
            "#,
        )
        .unwrap();
        assert_eq!(cfg.rollup.server_url, "http://rollup:5004");
        assert_eq!(cfg.session.slot_policy, SlotPolicy::WriteOnce);
        assert!(cfg.session.enforce_round_order);
        assert_eq!(cfg.signatures.scheme, SignatureScheme::Rsa);
        assert_eq!(cfg.keygen.max_prime_attempts, Some(100_000));
        assert_eq!(cfg.keygen.rsa_params().prime_bits, 1024);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            NodeConfig::from_toml("[keygen]\nsieve_limit = 2"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            NodeConfig::from_toml("[session]\nslot_policy = \"sometimes\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_override() {
        let mut cfg = NodeConfig::default();
        cfg.apply_env_override(Some("http://other:9000".into()));
        assert_eq!(cfg.rollup.server_url, "http://other:9000");
        cfg.apply_env_override(Some("  ".into()));
        assert_eq!(cfg.rollup.server_url, "http://other:9000");
        cfg.apply_env_override(None);
        assert_eq!(cfg.rollup.server_url, "http://other:9000");
    }

    #[test]
    fn test_load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().expect("temp file");
        write!(tmp, "[rollup]\nretry_delay_secs = 7\n").expect("write");
        let cfg = NodeConfig::load(Some(tmp.path())).expect("load");
        assert_eq!(cfg.rollup.retry_delay_secs, 7);
    }

    #[test]
    fn test_load_missing_file() {
        let err = NodeConfig::load(Some(Path::new("/nonexistent/conclave.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
