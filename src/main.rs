//! Killweb - kill-chain analysis CLI
//!
//! Loads a combat network scenario and runs connection generation,
//! kill-chain search, effectiveness scoring or topology evaluation
//! against it.

use anyhow::Result;
use clap::Parser;
use killweb::cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // RUST_LOG wins over --log-level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    cli::run(args)
}
