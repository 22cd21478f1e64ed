// SPDX-License-Identifier: Apache-2.0

//! `summary`: workflow counts over the organization's bot PRs.

use anyhow::Result;
use depdash_core::{AppConfig, WorkflowSummaryAggregator};

use super::types::SummaryResult;
use super::{build_dashboard, maybe_spinner, search};
use crate::cli::OutputContext;

/// Runs a search, then summarizes workflows for the resulting refresh tick.
pub async fn run(ctx: &OutputContext, config: &AppConfig) -> Result<SummaryResult> {
    let (mut dashboard, transport) = build_dashboard(config)?;
    search(&mut dashboard, ctx).await?;

    let aggregator = WorkflowSummaryAggregator::new(transport, config.github.clone());
    let spinner = maybe_spinner(ctx, "Reading workflow status...");
    let summary = aggregator
        .summarize(
            Some(dashboard.organization()),
            dashboard.token(),
            dashboard.refresh_tick(),
        )
        .await;
    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    Ok(SummaryResult {
        organization: dashboard.organization().to_string(),
        summary,
        truncated: dashboard.is_truncated(),
    })
}
