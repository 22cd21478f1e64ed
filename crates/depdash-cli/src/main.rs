// SPDX-License-Identifier: Apache-2.0

//! depdash - review and bulk-merge dependency update PRs.
//!
//! Lists the open PRs an update bot has raised across an organization,
//! groups them by title and closes or merges whole groups at once.

mod cli;
mod commands;
mod errors;
mod logging;
mod output;
mod provider;

pub use provider::CliTokenProvider;

use anyhow::{Context, Result};
use clap::Parser;
use depdash_core::config;
use tracing::debug;

use crate::cli::{Cli, OutputContext};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging();

    let output_ctx = OutputContext::from_cli(cli.output, cli.quiet, cli.verbose);

    let mut config = config::load_config().context("Failed to load configuration")?;
    debug!("Configuration loaded successfully");

    if let Some(org) = cli.org.as_deref().map(str::trim).filter(|o| !o.is_empty()) {
        config.user.default_org = Some(org.to_string());
        debug!("Overriding organization to: {org}");
    }

    match commands::run(cli.command, output_ctx, &config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let formatted = errors::format_error(&e);
            eprintln!("Error: {formatted}");
            std::process::exit(1);
        }
    }
}
