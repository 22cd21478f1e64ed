// SPDX-License-Identifier: Apache-2.0

//! Command handlers for the depdash CLI.

pub mod action;
pub mod completion;
pub mod list;
pub mod summary;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use depdash_core::{ApiTransport, AppConfig, Dashboard, HttpTransport, TokenProvider};

use crate::CliTokenProvider;
use crate::cli::{Commands, CompletionCommand, OutputContext};
use crate::output;

/// Creates a styled spinner (only if interactive).
fn maybe_spinner(ctx: &OutputContext, message: &str) -> Option<ProgressBar> {
    if ctx.is_interactive() {
        let s = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            s.set_style(template);
        }
        s.set_message(message.to_string());
        s.enable_steady_tick(Duration::from_millis(100));
        Some(s)
    } else {
        None
    }
}

/// Builds a dashboard for the configured organization with the resolved token.
///
/// A missing organization or token is left for the dashboard to report.
fn build_dashboard(config: &AppConfig) -> Result<(Dashboard, Arc<dyn ApiTransport>)> {
    let transport: Arc<dyn ApiTransport> = Arc::new(
        HttpTransport::from_config(&config.github).context("Failed to create HTTP client")?,
    );
    let mut dashboard = Dashboard::new(transport.clone(), config.github.clone());
    if let Some(org) = &config.user.default_org {
        dashboard.set_organization(org.clone());
    }
    dashboard.set_token(CliTokenProvider.github_token());
    Ok((dashboard, transport))
}

/// Runs a search with a spinner and returns the number of PRs found.
async fn search(dashboard: &mut Dashboard, ctx: &OutputContext) -> Result<usize> {
    let spinner = maybe_spinner(
        ctx,
        &format!("Searching bot PRs in {}...", dashboard.organization()),
    );
    let result = dashboard.search().await;
    if let Some(s) = spinner {
        s.finish_and_clear();
    }
    let found = result?;
    debug!(found, "Search complete");
    Ok(found)
}

/// Asks for confirmation unless disabled by `--yes` or the config.
///
/// Returns true when the action should proceed. Non-interactive sessions
/// cannot answer a prompt, so they need `--yes` or
/// `ui.confirm_before_action = false`.
fn confirm(ctx: &OutputContext, config: &AppConfig, yes: bool, prompt: &str) -> Result<bool> {
    if yes || !config.ui.confirm_before_action {
        return Ok(true);
    }
    if !ctx.is_interactive() {
        anyhow::bail!(
            "Refusing to act without confirmation in a non-interactive session. Pass --yes to proceed."
        );
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to get user confirmation")
}

/// Reports a declined prompt.
fn report_cancelled(ctx: &OutputContext) -> Result<()> {
    output::render(&types::Cancelled { cancelled: true }, ctx)
}

/// Dispatch to the appropriate command handler.
pub async fn run(command: Commands, ctx: OutputContext, config: &AppConfig) -> Result<()> {
    match command {
        Commands::List { expand, group } => {
            let result = list::run(&ctx, config, expand, group.as_deref()).await?;
            output::render(&result, &ctx)
        }

        Commands::Summary => {
            let result = summary::run(&ctx, config).await?;
            output::render(&result, &ctx)
        }

        Commands::Close { reference, yes } => {
            match action::close(&ctx, config, &reference, yes).await? {
                Some(result) => output::render(&result, &ctx),
                None => report_cancelled(&ctx),
            }
        }

        Commands::Merge { reference, yes } => {
            match action::merge(&ctx, config, &reference, yes).await? {
                Some(result) => output::render(&result, &ctx),
                None => report_cancelled(&ctx),
            }
        }

        Commands::CloseGroup { title, yes } => {
            match action::close_group(&ctx, config, &title, yes).await? {
                Some(result) => output::render(&result, &ctx),
                None => report_cancelled(&ctx),
            }
        }

        Commands::MergeGroup { title, yes } => {
            match action::merge_group(&ctx, config, &title, yes).await? {
                Some(result) => output::render(&result, &ctx),
                None => report_cancelled(&ctx),
            }
        }

        Commands::Completion(CompletionCommand::Generate { shell }) => {
            completion::run_generate(shell)
        }
    }
}
