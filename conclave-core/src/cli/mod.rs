//! Offline command-line tools.
//!
//! Every command is a plain function returning the text to print, so the
//! binary stays a thin clap wrapper and the commands are testable in-process.

pub mod keyagree;
pub mod rsa;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use thiserror::Error;

use conclave_protocol::{BdError, DhError, EncodingError, RsaError};

use crate::config::KeygenConfig;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Dh(#[from] DhError),
    #[error(transparent)]
    Bd(#[from] BdError),
    #[error(transparent)]
    Rsa(#[from] RsaError),
}

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "conclave")]
#[command(about = "Conclave - offline Burmester–Desmedt and RSA tools", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate a Diffie–Hellman key pair; prints the key and its round-1 value
    Generate {
        /// Seed for a reproducible key
        #[arg(long)]
        seed: Option<u64>,

        /// Private exponent size in bits (defaults to the configured size)
        #[arg(long)]
        bits: Option<u64>,
    },

    /// Compute this member's round-2 value
    #[command(name = "get-r2")]
    GetR2 {
        /// Marshalled key from `generate`
        key: String,
        /// Ring index of this member
        index: usize,
        /// Dot-joined round-1 values of all members
        r1s: String,
    },

    /// Reconstruct the group secret
    #[command(name = "get-secret")]
    GetSecret {
        key: String,
        index: usize,
        r1s: String,
        /// Dot-joined round-2 values of all members
        r2s: String,
    },

    /// Generate an RSA key set; prints the key set and its public key
    #[command(name = "rsa-generate")]
    RsaGenerate {
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Sign a message for the RSA identity scheme
    #[command(name = "rsa-sign")]
    RsaSign {
        /// Marshalled key set from `rsa-generate`
        keys: String,
        message: String,
    },

    /// Check an RSA identity signature; prints `valid` or `invalid`
    #[command(name = "rsa-verify")]
    RsaVerify {
        /// Marshalled public key
        public: String,
        message: String,
        signature: String,
    },
}

/// Seeded RNG when `seed` is given, OS entropy otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> ChaCha20Rng {
    match seed {
        Some(s) => ChaCha20Rng::seed_from_u64(s),
        None => ChaCha20Rng::from_entropy(),
    }
}

/// Run one command and return its output.
pub fn execute(command: &Command, keygen: &KeygenConfig) -> Result<String> {
    match command {
        Command::Generate { seed, bits } => {
            let bits = bits.unwrap_or(keygen.dh_exponent_bits);
            keyagree::generate(&mut rng_from_seed(*seed), bits)
        }
        Command::GetR2 { key, index, r1s } => keyagree::get_r2(key, *index, r1s),
        Command::GetSecret { key, index, r1s, r2s } => keyagree::get_secret(key, *index, r1s, r2s),
        Command::RsaGenerate { seed } => {
            rsa::generate(&mut rng_from_seed(*seed), &keygen.rsa_params())
        }
        Command::RsaSign { keys, message } => rsa::sign(keys, message),
        Command::RsaVerify {
            public,
            message,
            signature,
        } => rsa::verify(public, message, signature),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_r2() {
        let cli = Cli::try_parse_from(["conclave", "get-r2", "AQ==.Ag==", "1", "Aw==.BA=="]).unwrap();
        assert_eq!(
            cli.command,
            Command::GetR2 {
                key: "AQ==.Ag==".into(),
                index: 1,
                r1s: "Aw==.BA==".into(),
            }
        );
    }

    #[test]
    fn test_parse_generate_flags() {
        let cli = Cli::try_parse_from(["conclave", "-v", "generate", "--seed", "7", "--bits", "128"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Command::Generate {
                seed: Some(7),
                bits: Some(128)
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_index() {
        assert!(Cli::try_parse_from(["conclave", "get-r2", "k", "minus-one", "r"]).is_err());
    }

    #[test]
    fn test_seeded_generate_reproducible() {
        let cmd = Command::Generate {
            seed: Some(42),
            bits: None,
        };
        let cfg = KeygenConfig::default();
        assert_eq!(execute(&cmd, &cfg).unwrap(), execute(&cmd, &cfg).unwrap());
    }
}
