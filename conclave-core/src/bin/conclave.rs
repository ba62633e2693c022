//! Offline Conclave tools.

use anyhow::{Context, Result};
use clap::Parser;

use conclave::cli::{self, Cli};
use conclave::config::NodeConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    conclave::init_logging(cli.verbose);

    let config = NodeConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let output = cli::execute(&cli.command, &config.keygen)?;
    println!("{}", output);
    Ok(())
}
