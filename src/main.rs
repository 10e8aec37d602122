// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use capa_admission::{
    cli::Cli,
    constants::{DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
};
use clap::Parser;
use tracing::debug;

fn main() -> Result<()> {
    initialize_logging();

    let cli = Cli::parse();
    debug!(command = ?cli.command, "Running command");
    let output = cli.run()?;
    print!("{output}");
    Ok(())
}

fn initialize_logging() {
    // Format: timestamp file:line LEVEL message, written to stderr so stdout only
    // carries command output.
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Example: RUST_LOG=debug capa-admission validate --file cluster.yaml
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json capa-admission review --file review.json
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .compact()
                .init();
        }
    }
}
