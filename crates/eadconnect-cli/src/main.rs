// SPDX-License-Identifier: Apache-2.0

//! EADConnect - command-line client for the Grupo A education platform.
//!
//! Logs in with student credentials, lists courses, grades, messages and
//! notices, extracts exercises to PDF, and watches grades for changes.

mod cli;
mod commands;
mod errors;
mod logging;
mod output;
mod session;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use eadconnect_core::{AppConfig, load_config};
use tracing::debug;

use crate::cli::{Cli, Commands, OutputContext};

async fn run(cli: Cli) -> Result<()> {
    let output_ctx = OutputContext::from_cli(cli.output, cli.verbose);

    // Completion scripts must not depend on a readable config file.
    let config = if matches!(cli.command, Commands::Completion(_)) {
        AppConfig::default()
    } else {
        load_config().context("Failed to load configuration")?
    };
    debug!("Configuration loaded");

    commands::run(cli.command, output_ctx, &config).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.output, cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", errors::format_error(&e));
            ExitCode::FAILURE
        }
    }
}
