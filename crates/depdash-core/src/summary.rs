// SPDX-License-Identifier: Apache-2.0

//! Organization-wide workflow counts.
//!
//! Runs its own discovery query and per-PR lookups, independent of the
//! dashboard's groups; the two views may briefly disagree. Best effort:
//! failures shrink or zero the counts and are only logged.

use std::sync::Arc;

use futures::future::join_all;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::config::GitHubConfig;
use crate::github::api::{GitHubApi, SearchItem};
use crate::github::transport::ApiTransport;
use crate::model::{CiStatus, PullRequestRef, WorkflowSummary};
use crate::status::{map_combined_status, reconcile_check_runs, summarize_workflows};

/// Fetch-and-count pipeline behind the summary banner.
#[derive(Clone)]
pub struct WorkflowSummaryAggregator {
    transport: Arc<dyn ApiTransport>,
    config: GitHubConfig,
}

impl WorkflowSummaryAggregator {
    /// Creates an aggregator over the given transport and settings.
    #[must_use]
    pub fn new(transport: Arc<dyn ApiTransport>, config: GitHubConfig) -> Self {
        Self { transport, config }
    }

    /// Counts workflow statuses over the organization's open bot PRs.
    ///
    /// Returns zero counts without fetching when the organization or token
    /// is missing or blank, or when `tick` is 0 (no search has completed).
    #[instrument(skip(self, token))]
    pub async fn summarize(
        &self,
        organization: Option<&str>,
        token: Option<&SecretString>,
        tick: u64,
    ) -> WorkflowSummary {
        let organization = organization.map(str::trim).filter(|o| !o.is_empty());
        let token = token.filter(|t| !t.expose_secret().trim().is_empty());
        let (Some(organization), Some(token)) = (organization, token) else {
            return WorkflowSummary::default();
        };
        if tick == 0 {
            return WorkflowSummary::default();
        }

        let api = GitHubApi::new(self.transport.clone(), &self.config, token.clone());
        match collect(&api, organization).await {
            Ok(summary) => {
                debug!(
                    success = summary.success,
                    pending = summary.pending,
                    failed = summary.failed,
                    "Workflow summary computed"
                );
                summary
            }
            Err(err) => {
                warn!(error = %err, "Failed to fetch workflow summary");
                WorkflowSummary::default()
            }
        }
    }

    /// Recomputes the summary for the current tick and again on every
    /// change, until the sending side is dropped.
    pub async fn watch_ticks<F>(
        &self,
        mut ticks: watch::Receiver<u64>,
        organization: String,
        token: SecretString,
        mut on_summary: F,
    ) where
        F: FnMut(u64, WorkflowSummary),
    {
        loop {
            let tick = *ticks.borrow_and_update();
            let summary = self.summarize(Some(&organization), Some(&token), tick).await;
            on_summary(tick, summary);

            if ticks.changed().await.is_err() {
                break;
            }
        }
    }
}

async fn collect(api: &GitHubApi, organization: &str) -> crate::Result<WorkflowSummary> {
    let response = api.search_bot_pull_requests(organization).await?;
    let refs: Vec<Option<PullRequestRef>> = response
        .items
        .into_iter()
        .map(SearchItem::into_pull_request_ref)
        .collect();

    let statuses = join_all(refs.iter().map(|pr| async move {
        match pr {
            Some(pr) => workflow_status(api, pr).await,
            None => CiStatus::Unknown,
        }
    }))
    .await;

    Ok(summarize_workflows(statuses))
}

async fn workflow_status(api: &GitHubApi, pr: &PullRequestRef) -> CiStatus {
    match fetch_workflow_status(api, pr).await {
        Ok(status) => status,
        Err(err) => {
            warn!(number = pr.number, error = %err, "Error fetching workflow status for PR");
            CiStatus::Unknown
        }
    }
}

/// Check runs decide when there are any; an undecided set counts as
/// unknown. Without check runs the combined status is used.
async fn fetch_workflow_status(api: &GitHubApi, pr: &PullRequestRef) -> crate::Result<CiStatus> {
    let detail = api.pull_request(&pr.owner, &pr.repo, pr.number).await?;
    let runs = api.check_runs(&pr.owner, &pr.repo, &detail.head.sha).await?;

    if runs.is_empty() {
        let combined = api
            .combined_status(&pr.owner, &pr.repo, &detail.head.sha)
            .await?;
        return Ok(map_combined_status(combined.state.as_deref()));
    }
    Ok(reconcile_check_runs(&runs).unwrap_or(CiStatus::Unknown))
}
