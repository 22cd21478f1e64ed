// SPDX-License-Identifier: Apache-2.0

//! Merge strategy selection.

use crate::error::DepdashError;
use crate::model::{EnrichedPullRequest, MergeMethod};

/// Picks a merge method for a PR.
///
/// Order matters:
/// 1. one commit and rebase allowed: rebase
/// 2. several commits and squash allowed: squash
/// 3. merge commits allowed: merge
///
/// A single-commit PR in a repository without rebase falls through to the
/// merge commit rule; it is never squashed.
///
/// # Errors
///
/// Returns [`DepdashError::NoSuitableMergeMethod`] when no rule applies.
pub fn resolve_merge_method(
    number: u64,
    commits: u64,
    allow_rebase: bool,
    allow_squash: bool,
    allow_merge: bool,
) -> crate::Result<MergeMethod> {
    if commits == 1 && allow_rebase {
        return Ok(MergeMethod::Rebase);
    }
    if commits > 1 && allow_squash {
        return Ok(MergeMethod::Squash);
    }
    if allow_merge {
        return Ok(MergeMethod::Merge);
    }
    Err(DepdashError::NoSuitableMergeMethod { number })
}

/// [`resolve_merge_method`] applied to an enriched PR.
///
/// A PR whose commit count was never fetched counts as zero commits.
pub fn merge_method_for(pr: &EnrichedPullRequest) -> crate::Result<MergeMethod> {
    resolve_merge_method(
        pr.number(),
        pr.commits.unwrap_or(0),
        pr.allow_rebase_merge,
        pr.allow_squash_merge,
        pr.allow_merge_commit,
    )
}
