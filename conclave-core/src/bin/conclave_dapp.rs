//! Rollup handler process.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use conclave::config::{NodeConfig, SignatureScheme};
use conclave::rollup::{DappHandler, HttpRollupClient, Runner};

#[derive(Parser)]
#[command(name = "conclave-dapp")]
#[command(about = "Conclave rollup handler - tracks Burmester–Desmedt group sessions", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    conclave::init_logging(args.verbose);

    let config = NodeConfig::load(args.config.as_deref()).context("loading configuration")?;
    log::info!(
        "Conclave dapp {} using rollup server {}",
        conclave::VERSION,
        config.rollup.server_url
    );

    if config.signatures.scheme == SignatureScheme::Rsa {
        log::warn!("signatures.scheme = rsa: members must be RSA public keys delivered as msg_sender");
    }

    let client = HttpRollupClient::new(config.rollup.server_url.clone())?;
    let handler = DappHandler::new(config.session_store());
    let mut runner = Runner::new(client, handler, config.rollup.retry_delay());
    runner.run()
}
