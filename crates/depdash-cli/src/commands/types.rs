// SPDX-License-Identifier: Apache-2.0

//! Result types returned by command handlers and consumed by `output`.

use depdash_core::{
    AggregateStatus, BulkResult, EnrichedPullRequest, GroupView, MergeMethod, WorkflowSummary,
};
use serde::Serialize;

/// One group as shown by `list`.
#[derive(Debug, Serialize)]
pub struct GroupRow {
    /// Shared PR title.
    pub title: String,
    /// Folded CI status.
    pub status: AggregateStatus,
    /// Workflow counts over the members.
    pub workflows: WorkflowSummary,
    /// Whether members are shown in text output.
    pub expanded: bool,
    /// Members in discovery order.
    pub pull_requests: Vec<EnrichedPullRequest>,
}

impl From<GroupView<'_>> for GroupRow {
    fn from(view: GroupView<'_>) -> Self {
        Self {
            title: view.group.title.clone(),
            status: view.group.aggregate_status(),
            workflows: view.group.workflow_summary(),
            expanded: view.group.expanded,
            pull_requests: view.members.into_iter().cloned().collect(),
        }
    }
}

/// Result of `list`.
#[derive(Debug, Serialize)]
pub struct ListResult {
    /// Searched organization.
    pub organization: String,
    /// Matches reported by the search API.
    pub total_count: u64,
    /// True when the search returned fewer PRs than it matched.
    pub truncated: bool,
    /// Groups in first-seen order.
    pub groups: Vec<GroupRow>,
    /// Link to the dashboard's source.
    #[serde(skip)]
    pub source_repository_url: String,
}

impl ListResult {
    /// Number of PRs across all groups.
    pub fn pull_request_count(&self) -> usize {
        self.groups.iter().map(|g| g.pull_requests.len()).sum()
    }
}

/// Result of `summary`.
#[derive(Debug, Serialize)]
pub struct SummaryResult {
    /// Searched organization.
    pub organization: String,
    /// Workflow counts.
    #[serde(flatten)]
    pub summary: WorkflowSummary,
    /// True when the search returned fewer PRs than it matched.
    pub truncated: bool,
}

/// What happened to a single PR.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// PR was closed without merging.
    Closed,
    /// PR was approved and merged.
    Merged,
}

impl ActionKind {
    /// Past-tense label for text output.
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Closed => "Closed",
            ActionKind::Merged => "Merged",
        }
    }
}

/// Result of `close` and `merge`.
#[derive(Debug, Serialize)]
pub struct ActionResult {
    /// `owner/repo#N`.
    pub reference: String,
    /// PR title.
    pub title: String,
    /// What was done.
    pub action: ActionKind,
    /// Strategy used when merging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_method: Option<MergeMethod>,
}

/// Result of `close-group` and `merge-group`.
#[derive(Debug, Serialize)]
pub struct GroupActionResult<T> {
    /// Group title.
    pub title: String,
    /// What was done to each successful member.
    pub action: ActionKind,
    /// Per-member outcomes keyed by `owner/repo#N`.
    #[serde(flatten)]
    pub result: BulkResult<String, T>,
    /// True when the group was emptied and removed.
    pub group_removed: bool,
}

/// Returned when the user declines a confirmation prompt.
#[derive(Debug, Serialize)]
pub struct Cancelled {
    /// Always true; lets scripts tell a cancel apart from a result.
    pub cancelled: bool,
}
