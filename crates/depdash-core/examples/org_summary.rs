// SPDX-License-Identifier: Apache-2.0

//! Search an organization with a custom `TokenProvider` and print its groups
//! and workflow summary.
//!
//! Run with: `DEPDASH_EXAMPLE_TOKEN=ghp_... cargo run --example org_summary -p depdash-core -- acme`

use std::sync::Arc;

use depdash_core::{
    Dashboard, GitHubConfig, HttpTransport, TokenProvider, WorkflowSummaryAggregator,
};
use secrecy::SecretString;

/// Reads the token from a single environment variable.
struct EnvProvider;

impl TokenProvider for EnvProvider {
    fn github_token(&self) -> Option<SecretString> {
        std::env::var("DEPDASH_EXAMPLE_TOKEN")
            .ok()
            .map(SecretString::from)
    }
}

#[tokio::main]
async fn main() -> depdash_core::Result<()> {
    let organization = std::env::args().nth(1).unwrap_or_default();
    let config = GitHubConfig::default();
    let transport = Arc::new(HttpTransport::from_config(&config)?);

    let mut dashboard = Dashboard::new(transport.clone(), config.clone());
    dashboard.set_organization(organization.clone());
    dashboard.set_token(EnvProvider.github_token());
    dashboard.search().await?;

    for view in dashboard.views() {
        println!(
            "{} [{}] {} PR(s)",
            view.group.title,
            view.group.aggregate_status(),
            view.members.len()
        );
    }

    let aggregator = WorkflowSummaryAggregator::new(transport, config);
    let summary = aggregator
        .summarize(
            Some(&organization),
            dashboard.token(),
            dashboard.refresh_tick(),
        )
        .await;
    println!(
        "success: {}, pending: {}, failed: {}",
        summary.success, summary.pending, summary.failed
    );
    Ok(())
}
