// SPDX-License-Identifier: Apache-2.0

//! Per-PR enrichment.
//!
//! Four reads per PR: detail (commit count, head SHA), repository merge
//! flags, combined status of the head commit, and its check runs. Check
//! runs are authoritative when there are any; the combined status is the
//! fallback. A failure anywhere degrades that one PR to unknown status.

use futures::future::join_all;
use tracing::{debug, instrument, warn};

use crate::github::api::GitHubApi;
use crate::model::{CheckRun, CiStatus, EnrichedPullRequest};
use crate::status::{map_combined_status, reconcile_check_runs};

/// Enriches one PR in place.
///
/// Never fails: on any error the CI and workflow statuses are reset to
/// [`CiStatus::Unknown`] and the check runs are cleared.
#[instrument(skip_all, fields(repo = %pr.reference.full_repo_name(), number = pr.number()))]
pub async fn enrich_pull_request(api: &GitHubApi, pr: &mut EnrichedPullRequest) {
    if let Err(err) = fetch_details(api, pr).await {
        warn!(
            number = pr.number(),
            error = %err,
            "Failed to fetch details for PR"
        );
        pr.ci_status = CiStatus::Unknown;
        pr.workflow_status = CiStatus::Unknown;
        pr.check_runs.clear();
    }
}

/// Enriches every PR concurrently and waits for all of them to settle.
pub async fn enrich_all<'a, I>(api: &GitHubApi, prs: I)
where
    I: IntoIterator<Item = &'a mut EnrichedPullRequest>,
{
    join_all(prs.into_iter().map(|pr| enrich_pull_request(api, pr))).await;
}

async fn fetch_details(api: &GitHubApi, pr: &mut EnrichedPullRequest) -> crate::Result<()> {
    let owner = pr.reference.owner.clone();
    let repo = pr.reference.repo.clone();
    let number = pr.number();

    let (detail, repository) = tokio::try_join!(
        api.pull_request(&owner, &repo, number),
        api.repository(&owner, &repo)
    )?;

    pr.commits = Some(detail.commits);
    pr.head_sha = detail.head.sha;
    pr.allow_squash_merge = repository.allow_squash_merge;
    pr.allow_merge_commit = repository.allow_merge_commit;
    pr.allow_rebase_merge = repository.allow_rebase_merge;

    let sha = pr.head_sha.clone();
    let (combined, check_runs) = tokio::try_join!(
        api.combined_status(&owner, &repo, &sha),
        api.check_runs(&owner, &repo, &sha)
    )?;

    pr.ci_status = map_combined_status(combined.state.as_deref());
    apply_check_runs(pr, check_runs);

    debug!(
        ci_status = %pr.ci_status,
        workflow_status = %pr.workflow_status,
        check_runs = pr.check_runs.len(),
        "Enriched PR"
    );
    Ok(())
}

/// Reconciles freshly fetched check runs with the combined status already
/// stored in `pr.ci_status`, then replaces the PR's check runs.
///
/// With no check runs the workflow status mirrors the CI status. When runs
/// exist but none of the rules decide, the CI status keeps its combined
/// value and the workflow status is unknown.
pub fn apply_check_runs(pr: &mut EnrichedPullRequest, check_runs: Vec<CheckRun>) {
    if check_runs.is_empty() {
        pr.workflow_status = pr.ci_status;
    } else if let Some(status) = reconcile_check_runs(&check_runs) {
        pr.ci_status = status;
        pr.workflow_status = status;
    } else {
        pr.workflow_status = CiStatus::Unknown;
    }
    pr.check_runs = check_runs;
}
