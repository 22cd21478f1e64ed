// SPDX-License-Identifier: Apache-2.0

//! Mapping of GitHub status vocabularies onto [`CiStatus`] and the folds
//! that derive group-level state.
//!
//! Everything here is pure: same input, same output, no I/O.

use crate::model::{AggregateStatus, CheckConclusion, CheckRun, CheckRunStatus, CiStatus, WorkflowSummary};

/// Maps a combined-status `state` to a [`CiStatus`].
///
/// `error` counts as a failure; anything unrecognized or absent is unknown.
#[must_use]
pub fn map_combined_status(state: Option<&str>) -> CiStatus {
    match state {
        Some("success") => CiStatus::Success,
        Some("pending") => CiStatus::Pending,
        Some("failure" | "error") => CiStatus::Failure,
        _ => CiStatus::Unknown,
    }
}

/// Derives a status from a non-empty list of check runs.
///
/// Returns `None` when the list is empty or when none of the rules apply
/// (for example a cancelled run next to successful ones), leaving the
/// caller to fall back on another signal.
#[must_use]
pub fn reconcile_check_runs(runs: &[CheckRun]) -> Option<CiStatus> {
    if runs.is_empty() {
        return None;
    }

    if runs.iter().any(|run| {
        matches!(
            run.conclusion,
            Some(CheckConclusion::Failure | CheckConclusion::TimedOut)
        )
    }) {
        return Some(CiStatus::Failure);
    }

    if runs
        .iter()
        .any(|run| matches!(run.status, CheckRunStatus::InProgress | CheckRunStatus::Queued))
    {
        return Some(CiStatus::Pending);
    }

    if runs.iter().all(|run| {
        matches!(
            run.conclusion,
            Some(CheckConclusion::Success | CheckConclusion::Skipped | CheckConclusion::Neutral)
        )
    }) {
        return Some(CiStatus::Success);
    }

    None
}

/// Folds member CI statuses into a group status.
///
/// Failure beats pending, pending beats success; a non-empty group that is
/// not uniformly successful is mixed, and an empty group is unknown.
#[must_use]
pub fn aggregate_status<I>(statuses: I) -> AggregateStatus
where
    I: IntoIterator<Item = CiStatus>,
{
    let statuses: Vec<CiStatus> = statuses.into_iter().collect();

    if statuses.contains(&CiStatus::Failure) {
        AggregateStatus::Failure
    } else if statuses.contains(&CiStatus::Pending) {
        AggregateStatus::Pending
    } else if statuses.is_empty() {
        AggregateStatus::Unknown
    } else if statuses.iter().all(|s| *s == CiStatus::Success) {
        AggregateStatus::Success
    } else {
        AggregateStatus::Mixed
    }
}

/// Counts workflow statuses, leaving unknown ones out.
#[must_use]
pub fn summarize_workflows<I>(statuses: I) -> WorkflowSummary
where
    I: IntoIterator<Item = CiStatus>,
{
    statuses
        .into_iter()
        .fold(WorkflowSummary::default(), |mut summary, status| {
            match status {
                CiStatus::Success => summary.success += 1,
                CiStatus::Pending => summary.pending += 1,
                CiStatus::Failure => summary.failed += 1,
                CiStatus::Unknown => {}
            }
            summary
        })
}
