// SPDX-License-Identifier: Apache-2.0

//! Domain types for discovered and enriched pull requests.
//!
//! A [`PullRequestRef`] is what the discovery query yields; an
//! [`EnrichedPullRequest`] carries the CI, repository and action state
//! layered on top of it during a session.

use bon::Builder;
use serde::{Deserialize, Serialize};

/// Internal CI status of a single pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiStatus {
    /// All checks passed.
    Success,
    /// At least one check is still running.
    Pending,
    /// At least one check failed.
    Failure,
    /// No usable signal.
    #[default]
    Unknown,
}

impl std::fmt::Display for CiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CiStatus::Success => write!(f, "success"),
            CiStatus::Pending => write!(f, "pending"),
            CiStatus::Failure => write!(f, "failure"),
            CiStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Group-level CI status folded from member statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    /// Every member succeeded.
    Success,
    /// Some member failed.
    Failure,
    /// Some member is pending and none failed.
    Pending,
    /// Non-empty group with a mix of success and unknown.
    Mixed,
    /// Empty group.
    #[default]
    Unknown,
}

impl std::fmt::Display for AggregateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateStatus::Success => write!(f, "success"),
            AggregateStatus::Failure => write!(f, "failure"),
            AggregateStatus::Pending => write!(f, "pending"),
            AggregateStatus::Mixed => write!(f, "mixed"),
            AggregateStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Lifecycle status of a check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    /// Waiting for a runner.
    Queued,
    /// Running.
    InProgress,
    /// Finished; see the conclusion.
    Completed,
    /// Any status GitHub adds later (`waiting`, `requested`, ...).
    #[serde(other)]
    Other,
}

impl CheckRunStatus {
    /// Human-readable label for display.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CheckRunStatus::Queued => "Queued",
            CheckRunStatus::InProgress => "In Progress",
            CheckRunStatus::Completed | CheckRunStatus::Other => "Completed",
        }
    }
}

/// Final conclusion of a completed check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    /// Passed.
    Success,
    /// Failed.
    Failure,
    /// Neither passed nor failed.
    Neutral,
    /// Cancelled before finishing.
    Cancelled,
    /// Skipped by a condition.
    Skipped,
    /// Exceeded its time limit.
    TimedOut,
    /// Needs a manual action.
    ActionRequired,
    /// Any conclusion GitHub adds later (`stale`, ...).
    #[serde(other)]
    Other,
}

impl CheckConclusion {
    /// Wire name of the conclusion.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CheckConclusion::Success => "success",
            CheckConclusion::Failure => "failure",
            CheckConclusion::Neutral => "neutral",
            CheckConclusion::Cancelled => "cancelled",
            CheckConclusion::Skipped => "skipped",
            CheckConclusion::TimedOut => "timed_out",
            CheckConclusion::ActionRequired => "action_required",
            CheckConclusion::Other => "other",
        }
    }
}

/// Formats an optional conclusion for display.
///
/// A missing conclusion reads as "Pending"; snake case is turned into
/// title case (`timed_out` becomes "Timed Out").
#[must_use]
pub fn format_conclusion(conclusion: Option<CheckConclusion>) -> String {
    let Some(conclusion) = conclusion else {
        return "Pending".to_string();
    };
    conclusion
        .as_str()
        .split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One automated job's result for a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    /// Check run id.
    pub id: u64,
    /// Job name.
    pub name: String,
    /// Lifecycle status.
    pub status: CheckRunStatus,
    /// Conclusion, absent until completed.
    pub conclusion: Option<CheckConclusion>,
    /// Link to the run's details page.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Identity of a discovered pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct PullRequestRef {
    /// Global issue id.
    pub id: u64,
    /// Number within the repository.
    pub number: u64,
    /// PR title, also the grouping key.
    #[builder(into)]
    pub title: String,
    /// Repository owner.
    #[builder(into)]
    pub owner: String,
    /// Repository name.
    #[builder(into)]
    pub repo: String,
    /// Creation timestamp (ISO 8601).
    #[builder(into, default)]
    pub created_at: String,
    /// Login of the author.
    #[builder(into, default)]
    pub author: String,
    /// Label names.
    #[builder(default)]
    pub labels: Vec<String>,
    /// Web URL of the PR.
    #[builder(into, default)]
    pub html_url: String,
}

impl PullRequestRef {
    /// Returns `owner/repo`.
    #[must_use]
    pub fn full_repo_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Where a PR is in the bulk-action lifecycle.
///
/// Valid transitions: `Idle | Failed -> Processing -> Failed`, or the PR is
/// removed from the dashboard when the action succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActionState {
    /// No action in flight.
    #[default]
    Idle,
    /// A close or merge request is in flight.
    Processing,
    /// The last action failed; the PR stays for a retry.
    Failed {
        /// Scoped error message.
        message: String,
    },
}

impl ActionState {
    /// Returns true while an action is in flight.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        matches!(self, ActionState::Processing)
    }
}

/// A discovered PR plus everything learned about it afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedPullRequest {
    /// Identity fields.
    #[serde(flatten)]
    pub reference: PullRequestRef,
    /// Head commit SHA (empty until enriched).
    pub head_sha: String,
    /// Number of commits on the PR.
    pub commits: Option<u64>,
    /// Repository allows squash merges.
    pub allow_squash_merge: bool,
    /// Repository allows merge commits.
    pub allow_merge_commit: bool,
    /// Repository allows rebase merges.
    pub allow_rebase_merge: bool,
    /// CI status for the head commit.
    pub ci_status: CiStatus,
    /// Workflow status, preferentially from check runs.
    pub workflow_status: CiStatus,
    /// Check runs from the latest enrichment.
    pub check_runs: Vec<CheckRun>,
    /// Bulk-action state.
    pub action: ActionState,
}

impl EnrichedPullRequest {
    /// Wraps a freshly discovered PR with unknown enrichment fields.
    #[must_use]
    pub fn new(reference: PullRequestRef) -> Self {
        Self {
            reference,
            head_sha: String::new(),
            commits: None,
            allow_squash_merge: false,
            allow_merge_commit: false,
            allow_rebase_merge: false,
            ci_status: CiStatus::Unknown,
            workflow_status: CiStatus::Unknown,
            check_runs: Vec::new(),
            action: ActionState::Idle,
        }
    }

    /// Global id of the PR.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.reference.id
    }

    /// Number of the PR within its repository.
    #[must_use]
    pub fn number(&self) -> u64 {
        self.reference.number
    }

    /// Title of the PR.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.reference.title
    }

    /// True when someone pushed extra commits on top of the bot's.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.commits.is_some_and(|c| c > 1)
    }

    /// Shorthand for `self.action.is_processing()`.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.action.is_processing()
    }
}

/// Merge strategy sent to the merge endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMethod {
    /// Merge commit.
    Merge,
    /// Squash into one commit.
    Squash,
    /// Rebase onto the base branch.
    Rebase,
}

impl MergeMethod {
    /// Wire value for the `merge_method` field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MergeMethod::Merge => "merge",
            MergeMethod::Squash => "squash",
            MergeMethod::Rebase => "rebase",
        }
    }
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Success/pending/failed counts over a set of PRs.
///
/// Unknown statuses are not counted anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkflowSummary {
    /// PRs whose workflows passed.
    pub success: usize,
    /// PRs whose workflows are running.
    pub pending: usize,
    /// PRs whose workflows failed.
    pub failed: usize,
}

impl WorkflowSummary {
    /// Sum of the three counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.success + self.pending + self.failed
    }
}
