// SPDX-License-Identifier: Apache-2.0

//! Dashboard controller.
//!
//! [`Dashboard`] owns the PR store, the search form inputs, the single
//! error slot and the refresh tick that drives the workflow summary. Every
//! search and bulk action goes through it, and every state change is
//! announced to subscribed observers as a [`DashboardEvent`].

use std::collections::HashSet;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::bulk::BulkResult;
use crate::config::GitHubConfig;
use crate::error::DepdashError;
use crate::github::api::GitHubApi;
use crate::github::transport::ApiTransport;
use crate::merge::merge_method_for;
use crate::model::{ActionState, CiStatus, EnrichedPullRequest, MergeMethod};
use crate::search::discover;
use crate::store::{GroupView, PrGroup, PrStore};

/// State change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    /// A search cycle began; groups were cleared.
    SearchStarted,
    /// A search cycle ended, successfully or not.
    SearchFinished,
    /// A PR's action state changed.
    PullRequestChanged(u64),
    /// A PR was closed or merged and left the dashboard.
    PullRequestRemoved(u64),
    /// A group lost its last member.
    GroupRemoved(String),
    /// A group was expanded or collapsed.
    GroupToggled(String),
    /// The error slot changed.
    ErrorChanged,
    /// The refresh tick advanced to the given value.
    RefreshTick(u64),
}

type Observer = Box<dyn Fn(&DashboardEvent) + Send + Sync>;

/// Single owner of the dashboard state.
pub struct Dashboard {
    transport: Arc<dyn ApiTransport>,
    config: GitHubConfig,
    organization: String,
    token: Option<SecretString>,
    store: PrStore,
    error: Option<String>,
    is_loading: bool,
    searched: bool,
    total_count: u64,
    truncated: bool,
    refresh: watch::Sender<u64>,
    observers: Vec<Observer>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("organization", &self.organization)
            .field("groups", &self.store.groups().len())
            .field("error", &self.error)
            .field("is_loading", &self.is_loading)
            .field("refresh_tick", &self.refresh_tick())
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Creates an empty dashboard.
    #[must_use]
    pub fn new(transport: Arc<dyn ApiTransport>, config: GitHubConfig) -> Self {
        let (refresh, _) = watch::channel(0);
        Self {
            transport,
            config,
            organization: String::new(),
            token: None,
            store: PrStore::default(),
            error: None,
            is_loading: false,
            searched: false,
            total_count: 0,
            truncated: false,
            refresh,
            observers: Vec::new(),
        }
    }

    /// Registers a change listener.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&DashboardEvent) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Receiver following the refresh tick.
    #[must_use]
    pub fn refresh_receiver(&self) -> watch::Receiver<u64> {
        self.refresh.subscribe()
    }

    fn emit(&self, event: &DashboardEvent) {
        for observer in &self.observers {
            observer(event);
        }
    }

    // --- Form ---

    /// Sets the organization to search.
    pub fn set_organization(&mut self, organization: impl Into<String>) {
        self.organization = organization.into();
    }

    /// Sets or clears the personal access token.
    pub fn set_token(&mut self, token: Option<SecretString>) {
        self.token = token;
    }

    /// Organization as entered.
    #[must_use]
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Token as entered.
    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// True when both organization and token are non-blank.
    #[must_use]
    pub fn form_valid(&self) -> bool {
        !self.organization.trim().is_empty()
            && self
                .token
                .as_ref()
                .is_some_and(|t| !t.expose_secret().trim().is_empty())
    }

    fn require_api(&mut self) -> crate::Result<GitHubApi> {
        if self.form_valid()
            && let Some(token) = self.token.clone()
        {
            return Ok(GitHubApi::new(self.transport.clone(), &self.config, token));
        }
        let err = DepdashError::MissingCredentials;
        self.set_error(err.to_string());
        Err(err)
    }

    // --- Read access ---

    /// Groups in display order.
    #[must_use]
    pub fn groups(&self) -> &[PrGroup] {
        self.store.groups()
    }

    /// Group by title.
    #[must_use]
    pub fn group(&self, title: &str) -> Option<&PrGroup> {
        self.store.group(title)
    }

    /// Groups with their member records.
    #[must_use]
    pub fn views(&self) -> Vec<GroupView<'_>> {
        self.store.views()
    }

    /// PR by id.
    #[must_use]
    pub fn pull_request(&self, id: u64) -> Option<&EnrichedPullRequest> {
        self.store.pull_request(id)
    }

    /// PR by repository and number.
    #[must_use]
    pub fn find_pull_request(&self, owner: &str, repo: &str, number: u64) -> Option<&EnrichedPullRequest> {
        self.store.find(owner, repo, number)
    }

    /// Members of a group in group order.
    #[must_use]
    pub fn members(&self, title: &str) -> Vec<&EnrichedPullRequest> {
        self.store.members(title)
    }

    /// Ids of expanded PRs.
    #[must_use]
    pub fn expanded_prs(&self) -> &HashSet<u64> {
        self.store.expanded_prs()
    }

    /// Most recent error message.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while a search is running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// True once a search has been attempted.
    #[must_use]
    pub fn searched(&self) -> bool {
        self.searched
    }

    /// True while any member of the group has an action in flight.
    #[must_use]
    pub fn is_group_processing(&self, title: &str) -> bool {
        self.store.is_group_processing(title)
    }

    /// Current refresh tick; 0 until the first search completes.
    #[must_use]
    pub fn refresh_tick(&self) -> u64 {
        *self.refresh.borrow()
    }

    /// Matches the server reported for the last search.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// True when the last search returned fewer PRs than the server has.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    // --- State helpers ---

    fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.emit(&DashboardEvent::ErrorChanged);
    }

    fn clear_error(&mut self) {
        if self.error.take().is_some() {
            self.emit(&DashboardEvent::ErrorChanged);
        }
    }

    fn bump_refresh(&mut self) {
        self.refresh.send_modify(|tick| *tick += 1);
        let tick = self.refresh_tick();
        debug!(tick, "Refresh tick");
        self.emit(&DashboardEvent::RefreshTick(tick));
    }

    // --- Expansion ---

    /// Flips a group's expansion; collapsing also collapses its PRs.
    pub fn toggle_group(&mut self, title: &str) -> crate::Result<bool> {
        let expanded = self
            .store
            .toggle_group(title)
            .ok_or_else(|| DepdashError::UnknownGroup {
                title: title.to_string(),
            })?;
        self.emit(&DashboardEvent::GroupToggled(title.to_string()));
        Ok(expanded)
    }

    /// Flips one PR's membership in the expanded set.
    pub fn toggle_pr(&mut self, id: u64) -> crate::Result<bool> {
        let expanded = self
            .store
            .toggle_pr(id)
            .ok_or(DepdashError::UnknownPullRequest { id })?;
        self.emit(&DashboardEvent::PullRequestChanged(id));
        Ok(expanded)
    }

    // --- Search ---

    /// Discovers, groups and enriches the organization's bot PRs,
    /// replacing all current groups. Returns the number of PRs found.
    ///
    /// # Errors
    ///
    /// [`DepdashError::MissingCredentials`] when the form is incomplete;
    /// the discovery query's error when it fails. Both are also put in the
    /// error slot.
    #[instrument(skip(self), fields(organization = %self.organization))]
    pub async fn search(&mut self) -> crate::Result<usize> {
        let api = self.require_api()?;
        let organization = self.organization.trim().to_string();

        self.is_loading = true;
        self.clear_error();
        self.store = PrStore::default();
        self.total_count = 0;
        self.truncated = false;
        self.searched = true;
        self.emit(&DashboardEvent::SearchStarted);

        let result = discover(&api, &organization).await;
        self.is_loading = false;

        match result {
            Ok(outcome) => {
                self.total_count = outcome.total_count;
                self.truncated = outcome.is_truncated();
                self.store = outcome.store;
                self.emit(&DashboardEvent::SearchFinished);
                self.bump_refresh();
                Ok(self.store.len())
            }
            Err(err) => {
                self.set_error(err.to_string());
                self.emit(&DashboardEvent::SearchFinished);
                Err(err)
            }
        }
    }

    // --- Single PR actions ---

    /// Closes one PR and removes it from the dashboard.
    ///
    /// # Errors
    ///
    /// Returns the remote error; the PR stays, marked failed, and the
    /// error slot reads `Failed to close PR #N: ...`.
    pub async fn close_pr(&mut self, id: u64) -> crate::Result<()> {
        let api = self.require_api()?;
        self.close_member(&api, id).await?;
        self.bump_refresh();
        Ok(())
    }

    /// Approves and merges one PR, then removes it from the dashboard.
    ///
    /// A PR with a failing workflow is rejected before any request.
    ///
    /// # Errors
    ///
    /// Returns the failing step's error; the PR stays, marked failed, and
    /// the error slot reads `Failed to merge PR #N: ...`.
    pub async fn approve_and_merge_pr(&mut self, id: u64) -> crate::Result<MergeMethod> {
        let api = self.require_api()?;
        let method = self.merge_member(&api, id).await?;
        self.bump_refresh();
        Ok(method)
    }

    // --- Group actions ---

    /// Closes every member of a group, one at a time.
    ///
    /// Failures are isolated per member. One refresh tick is emitted at
    /// the end.
    #[instrument(skip(self))]
    pub async fn close_group(&mut self, title: &str) -> crate::Result<BulkResult<String, ()>> {
        let api = self.require_api()?;
        let snapshot = self.snapshot(title)?;
        let mut result = BulkResult::default();
        if snapshot.is_empty() {
            return Ok(result);
        }

        for id in snapshot {
            let Some(label) = self.label(id) else {
                continue;
            };
            match self.close_member(&api, id).await {
                Ok(()) => result.record_success(label, ()),
                Err(err) => result.record_failure(label, err.to_string()),
            }
        }

        self.bump_refresh();
        info!(
            succeeded = result.succeeded,
            failed = result.failed,
            "Close group finished"
        );
        Ok(result)
    }

    /// Approves and merges every member of a group whose workflow is not
    /// failing, one at a time.
    ///
    /// Members with a failing workflow are recorded as skipped.
    ///
    /// # Errors
    ///
    /// [`DepdashError::NoEligiblePullRequests`] when every member has a
    /// failing workflow; no request is made and the members are untouched.
    #[instrument(skip(self))]
    pub async fn approve_and_merge_group(
        &mut self,
        title: &str,
    ) -> crate::Result<BulkResult<String, MergeMethod>> {
        let api = self.require_api()?;
        let snapshot = self.snapshot(title)?;
        let mut result = BulkResult::default();
        if snapshot.is_empty() {
            return Ok(result);
        }

        let eligible = snapshot
            .iter()
            .filter(|id| {
                self.store
                    .pull_request(**id)
                    .is_some_and(|pr| pr.workflow_status != CiStatus::Failure)
            })
            .count();
        if eligible == 0 {
            let err = DepdashError::NoEligiblePullRequests {
                title: title.to_string(),
            };
            self.set_error(err.to_string());
            return Err(err);
        }

        for id in snapshot {
            let Some(pr) = self.store.pull_request(id) else {
                continue;
            };
            let label = label_of(pr);
            if pr.workflow_status == CiStatus::Failure {
                let reason = DepdashError::FailingWorkflow { number: pr.number() };
                result.record_skipped(label, reason.to_string());
                continue;
            }
            match self.merge_member(&api, id).await {
                Ok(method) => result.record_success(label, method),
                Err(err) => result.record_failure(label, err.to_string()),
            }
        }

        self.bump_refresh();
        info!(
            succeeded = result.succeeded,
            failed = result.failed,
            skipped = result.skipped,
            "Merge group finished"
        );
        Ok(result)
    }

    fn snapshot(&self, title: &str) -> crate::Result<Vec<u64>> {
        self.store
            .group(title)
            .map(|g| g.pr_ids.clone())
            .ok_or_else(|| DepdashError::UnknownGroup {
                title: title.to_string(),
            })
    }

    fn label(&self, id: u64) -> Option<String> {
        self.store.pull_request(id).map(label_of)
    }

    // --- Member lifecycle ---

    async fn close_member(&mut self, api: &GitHubApi, id: u64) -> crate::Result<()> {
        let (owner, repo, number) = self.start_action(id)?;
        match api.close_pull_request(&owner, &repo, number).await {
            Ok(()) => {
                self.complete_action(id);
                Ok(())
            }
            Err(err) => {
                self.fail_action(id, format!("Failed to close PR #{number}: {err}"));
                Err(err)
            }
        }
    }

    async fn merge_member(&mut self, api: &GitHubApi, id: u64) -> crate::Result<MergeMethod> {
        let (owner, repo, number) = self.start_action(id)?;
        match self.approve_and_merge_remote(api, id, &owner, &repo, number).await {
            Ok(method) => {
                self.complete_action(id);
                Ok(method)
            }
            Err(err) => {
                self.fail_action(id, format!("Failed to merge PR #{number}: {err}"));
                Err(err)
            }
        }
    }

    async fn approve_and_merge_remote(
        &self,
        api: &GitHubApi,
        id: u64,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> crate::Result<MergeMethod> {
        let pr = self
            .store
            .pull_request(id)
            .ok_or(DepdashError::UnknownPullRequest { id })?;
        if pr.workflow_status == CiStatus::Failure {
            return Err(DepdashError::FailingWorkflow { number });
        }

        api.approve_pull_request(owner, repo, number).await?;
        let method = merge_method_for(pr)?;
        api.merge_pull_request(owner, repo, number, method).await?;
        debug!(number, merge_method = %method, "Merged PR");
        Ok(method)
    }

    /// Idle or failed to processing.
    fn start_action(&mut self, id: u64) -> crate::Result<(String, String, u64)> {
        let pr = self
            .store
            .pull_request_mut(id)
            .ok_or(DepdashError::UnknownPullRequest { id })?;
        pr.action = ActionState::Processing;
        let target = (
            pr.reference.owner.clone(),
            pr.reference.repo.clone(),
            pr.number(),
        );
        self.emit(&DashboardEvent::PullRequestChanged(id));
        Ok(target)
    }

    /// Processing to removed.
    fn complete_action(&mut self, id: u64) {
        if let Some(removal) = self.store.remove(id) {
            self.emit(&DashboardEvent::PullRequestRemoved(id));
            if removal.group_removed {
                self.emit(&DashboardEvent::GroupRemoved(removal.group_title));
            }
        }
    }

    /// Processing to failed; the message also goes to the error slot.
    fn fail_action(&mut self, id: u64, message: String) {
        if let Some(pr) = self.store.pull_request_mut(id) {
            pr.action = ActionState::Failed {
                message: message.clone(),
            };
            self.emit(&DashboardEvent::PullRequestChanged(id));
        }
        self.set_error(message);
    }
}

fn label_of(pr: &EnrichedPullRequest) -> String {
    format!("{}#{}", pr.reference.full_repo_name(), pr.number())
}
