//! cipherkit command-line entry point.
//!
//! Thin wrapper around the cipherkit library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Runs one subcommand against the built-in registry

mod commands;
mod config;

use anyhow::Result;
use cipherkit::Registry;
use clap::Parser;

use crate::config::CliConfig;

fn main() -> Result<()> {
    let config = CliConfig::parse();

    // Diagnostics go to stderr so stdout carries only results
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let registry = Registry::with_builtins();
    tracing::debug!("Loaded {} ciphers", registry.len());

    let output = commands::run(&registry, &config.command)?;
    println!("{output}");

    Ok(())
}
