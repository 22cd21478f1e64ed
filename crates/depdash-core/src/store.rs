// SPDX-License-Identifier: Apache-2.0

//! Arena of enriched PRs plus their title-keyed groups.
//!
//! PRs live in a map keyed by id; a group only holds the ordered ids of its
//! members. Group aggregates are recomputed from the members whenever
//! membership changes and are never written from outside.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::model::{AggregateStatus, EnrichedPullRequest, PullRequestRef, WorkflowSummary};
use crate::status::{aggregate_status, summarize_workflows};

/// Title-keyed cluster of PRs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrGroup {
    /// Shared PR title.
    pub title: String,
    /// Member ids in first-seen order.
    pub pr_ids: Vec<u64>,
    /// Whether the group is expanded in the view.
    pub expanded: bool,
    aggregate_status: AggregateStatus,
    workflow_summary: WorkflowSummary,
}

impl PrGroup {
    fn new(title: String) -> Self {
        Self {
            title,
            pr_ids: Vec::new(),
            expanded: false,
            aggregate_status: AggregateStatus::Unknown,
            workflow_summary: WorkflowSummary::default(),
        }
    }

    /// Folded CI status of the members.
    #[must_use]
    pub fn aggregate_status(&self) -> AggregateStatus {
        self.aggregate_status
    }

    /// Workflow counts of the members.
    #[must_use]
    pub fn workflow_summary(&self) -> WorkflowSummary {
        self.workflow_summary
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pr_ids.len()
    }

    /// True for a group without members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pr_ids.is_empty()
    }
}

/// A group with its member records, for rendering.
#[derive(Debug, Serialize)]
pub struct GroupView<'a> {
    /// Group fields.
    #[serde(flatten)]
    pub group: &'a PrGroup,
    /// Members in group order.
    pub members: Vec<&'a EnrichedPullRequest>,
}

/// What [`PrStore::remove`] took out.
#[derive(Debug)]
pub struct Removal {
    /// The removed PR.
    pub pull_request: EnrichedPullRequest,
    /// Title of the group it belonged to.
    pub group_title: String,
    /// True when the group became empty and was dropped.
    pub group_removed: bool,
}

/// PR arena plus ordered groups and the expanded-PR selection.
#[derive(Debug, Default)]
pub struct PrStore {
    prs: HashMap<u64, EnrichedPullRequest>,
    groups: Vec<PrGroup>,
    expanded_prs: HashSet<u64>,
}

impl PrStore {
    /// Groups discovered PRs by exact title, keeping first-seen order of
    /// groups and of members. A repeated id keeps its first occurrence.
    #[must_use]
    pub fn from_refs<I>(refs: I) -> Self
    where
        I: IntoIterator<Item = PullRequestRef>,
    {
        let mut store = Self::default();
        let mut index: HashMap<String, usize> = HashMap::new();

        for reference in refs {
            let id = reference.id;
            if store.prs.contains_key(&id) {
                debug!(id, "Ignoring duplicate PR in discovery results");
                continue;
            }

            let slot = *index.entry(reference.title.clone()).or_insert_with(|| {
                store.groups.push(PrGroup::new(reference.title.clone()));
                store.groups.len() - 1
            });
            store.groups[slot].pr_ids.push(id);
            store.prs.insert(id, EnrichedPullRequest::new(reference));
        }

        store.recompute_all();
        store
    }

    /// Recomputes every group's aggregate status and workflow summary.
    pub fn recompute_all(&mut self) {
        for idx in 0..self.groups.len() {
            self.recompute(idx);
        }
    }

    fn recompute(&mut self, idx: usize) {
        let prs = &self.prs;
        let group = &mut self.groups[idx];
        let members: Vec<&EnrichedPullRequest> =
            group.pr_ids.iter().filter_map(|id| prs.get(id)).collect();

        group.aggregate_status = aggregate_status(members.iter().map(|pr| pr.ci_status));
        group.workflow_summary = summarize_workflows(members.iter().map(|pr| pr.workflow_status));
    }

    fn group_index(&self, title: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.title == title)
    }

    /// Groups in display order.
    #[must_use]
    pub fn groups(&self) -> &[PrGroup] {
        &self.groups
    }

    /// Group by title.
    #[must_use]
    pub fn group(&self, title: &str) -> Option<&PrGroup> {
        self.groups.iter().find(|g| g.title == title)
    }

    /// Every group with its members.
    #[must_use]
    pub fn views(&self) -> Vec<GroupView<'_>> {
        self.groups
            .iter()
            .map(|group| GroupView {
                group,
                members: group.pr_ids.iter().filter_map(|id| self.prs.get(id)).collect(),
            })
            .collect()
    }

    /// PR by id.
    #[must_use]
    pub fn pull_request(&self, id: u64) -> Option<&EnrichedPullRequest> {
        self.prs.get(&id)
    }

    /// Mutable PR by id.
    ///
    /// Callers changing CI or workflow status must call
    /// [`PrStore::recompute_all`] afterwards.
    pub fn pull_request_mut(&mut self, id: u64) -> Option<&mut EnrichedPullRequest> {
        self.prs.get_mut(&id)
    }

    /// All PRs, in no particular order.
    pub fn pull_requests_mut(&mut self) -> impl Iterator<Item = &mut EnrichedPullRequest> {
        self.prs.values_mut()
    }

    /// Members of a group in group order.
    #[must_use]
    pub fn members(&self, title: &str) -> Vec<&EnrichedPullRequest> {
        self.group(title)
            .map(|g| g.pr_ids.iter().filter_map(|id| self.prs.get(id)).collect())
            .unwrap_or_default()
    }

    /// Finds a PR by repository and number.
    #[must_use]
    pub fn find(&self, owner: &str, repo: &str, number: u64) -> Option<&EnrichedPullRequest> {
        self.prs.values().find(|pr| {
            pr.number() == number
                && pr.reference.owner.eq_ignore_ascii_case(owner)
                && pr.reference.repo.eq_ignore_ascii_case(repo)
        })
    }

    /// Number of PRs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prs.len()
    }

    /// True when no PRs are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prs.is_empty()
    }

    /// True while any member of the group has an action in flight.
    #[must_use]
    pub fn is_group_processing(&self, title: &str) -> bool {
        self.members(title).iter().any(|pr| pr.is_processing())
    }

    /// Removes a PR, shrinking its group and dropping the group once empty.
    pub fn remove(&mut self, id: u64) -> Option<Removal> {
        let pull_request = self.prs.remove(&id)?;
        self.expanded_prs.remove(&id);

        let Some(idx) = self.groups.iter().position(|g| g.pr_ids.contains(&id)) else {
            return Some(Removal {
                group_title: pull_request.title().to_string(),
                pull_request,
                group_removed: false,
            });
        };

        self.groups[idx].pr_ids.retain(|member| *member != id);
        let group_title = self.groups[idx].title.clone();
        let group_removed = self.groups[idx].is_empty();
        if group_removed {
            self.groups.remove(idx);
        } else {
            self.recompute(idx);
        }

        Some(Removal {
            pull_request,
            group_title,
            group_removed,
        })
    }

    /// Flips a group's expansion. Collapsing also collapses its PRs.
    ///
    /// Returns the new state, or `None` for an unknown title.
    pub fn toggle_group(&mut self, title: &str) -> Option<bool> {
        let idx = self.group_index(title)?;
        let group = &mut self.groups[idx];
        group.expanded = !group.expanded;
        if !group.expanded {
            for id in &group.pr_ids {
                self.expanded_prs.remove(id);
            }
        }
        Some(group.expanded)
    }

    /// Flips one PR's membership in the expanded set.
    ///
    /// Returns the new state, or `None` for an unknown id.
    pub fn toggle_pr(&mut self, id: u64) -> Option<bool> {
        if !self.prs.contains_key(&id) {
            return None;
        }
        if self.expanded_prs.remove(&id) {
            Some(false)
        } else {
            self.expanded_prs.insert(id);
            Some(true)
        }
    }

    /// Ids of expanded PRs.
    #[must_use]
    pub fn expanded_prs(&self) -> &HashSet<u64> {
        &self.expanded_prs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActionState, CiStatus};

    fn reference(id: u64, title: &str) -> PullRequestRef {
        PullRequestRef::builder()
            .id(id)
            .number(id * 10)
            .title(title)
            .owner("acme")
            .repo(format!("repo-{id}"))
            .build()
    }

    fn three_prs() -> PrStore {
        PrStore::from_refs(vec![
            reference(1, "Update A"),
            reference(2, "Update B"),
            reference(3, "Update A"),
        ])
    }

    #[test]
    fn test_grouping_keeps_first_seen_order() {
        let store = three_prs();
        let titles: Vec<&str> = store.groups().iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Update A", "Update B"]);
        assert_eq!(store.groups()[0].pr_ids, vec![1, 3]);
        assert_eq!(store.groups()[1].pr_ids, vec![2]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_titles_are_exact_keys() {
        let store = PrStore::from_refs(vec![reference(1, "Update A"), reference(2, "update a")]);
        assert_eq!(store.groups().len(), 2);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let store = PrStore::from_refs(vec![reference(1, "Update A"), reference(1, "Update B")]);
        assert_eq!(store.groups().len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_fresh_groups_are_unknown() {
        let store = three_prs();
        // every member is unknown: non-empty, not all success
        assert_eq!(store.groups()[0].aggregate_status(), AggregateStatus::Mixed);
        assert_eq!(store.groups()[0].workflow_summary().total(), 0);
    }

    #[test]
    fn test_removing_sole_member_drops_group() {
        let mut store = three_prs();
        let removal = store.remove(2).unwrap();
        assert!(removal.group_removed);
        assert_eq!(removal.group_title, "Update B");
        assert!(store.group("Update B").is_none());
        assert_eq!(store.groups().len(), 1);
    }

    #[test]
    fn test_removing_one_of_two_keeps_group() {
        let mut store = three_prs();
        let removal = store.remove(1).unwrap();
        assert!(!removal.group_removed);
        assert_eq!(store.group("Update A").unwrap().pr_ids, vec![3]);
        assert!(store.pull_request(1).is_none());
    }

    #[test]
    fn test_removal_recomputes_aggregates() {
        let mut store = three_prs();
        store.pull_request_mut(1).unwrap().ci_status = CiStatus::Failure;
        store.pull_request_mut(1).unwrap().workflow_status = CiStatus::Failure;
        store.pull_request_mut(3).unwrap().ci_status = CiStatus::Success;
        store.pull_request_mut(3).unwrap().workflow_status = CiStatus::Success;
        store.recompute_all();
        assert_eq!(store.group("Update A").unwrap().aggregate_status(), AggregateStatus::Failure);

        store.remove(1);

        let group = store.group("Update A").unwrap();
        assert_eq!(group.aggregate_status(), AggregateStatus::Success);
        assert_eq!(group.workflow_summary().success, 1);
        assert_eq!(group.workflow_summary().failed, 0);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut store = three_prs();
        assert!(store.remove(42).is_none());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_remove_drops_expanded_selection() {
        let mut store = three_prs();
        assert_eq!(store.toggle_pr(1), Some(true));
        store.remove(1);
        assert!(!store.expanded_prs().contains(&1));
    }

    #[test]
    fn test_collapsing_group_collapses_members() {
        let mut store = three_prs();
        assert_eq!(store.toggle_group("Update A"), Some(true));
        store.toggle_pr(1);
        store.toggle_pr(2);
        assert_eq!(store.toggle_group("Update A"), Some(false));
        assert!(!store.expanded_prs().contains(&1));
        assert!(store.expanded_prs().contains(&2));
        assert_eq!(store.toggle_group("Nope"), None);
    }

    #[test]
    fn test_toggle_pr_flips() {
        let mut store = three_prs();
        assert_eq!(store.toggle_pr(3), Some(true));
        assert_eq!(store.toggle_pr(3), Some(false));
        assert_eq!(store.toggle_pr(99), None);
    }

    #[test]
    fn test_find_by_repository_and_number() {
        let store = three_prs();
        assert_eq!(store.find("acme", "repo-3", 30).unwrap().id(), 3);
        assert_eq!(store.find("ACME", "Repo-3", 30).unwrap().id(), 3);
        assert!(store.find("acme", "repo-3", 31).is_none());
    }

    #[test]
    fn test_group_processing_flag() {
        let mut store = three_prs();
        assert!(!store.is_group_processing("Update A"));
        store.pull_request_mut(3).unwrap().action = ActionState::Processing;
        assert!(store.is_group_processing("Update A"));
        assert!(!store.is_group_processing("Update B"));
    }

    #[test]
    fn test_views_follow_group_order() {
        let store = three_prs();
        let views = store.views();
        assert_eq!(views.len(), 2);
        let ids: Vec<u64> = views[0].members.iter().map(|pr| pr.id()).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
