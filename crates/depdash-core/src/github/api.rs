// SPDX-License-Identifier: Apache-2.0

//! Typed GitHub REST endpoints used by the dashboard.
//!
//! [`GitHubApi`] binds a transport, the API base URL, the bot author and a
//! token; each method maps to exactly one REST call.

use std::sync::Arc;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::Method;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::parse_repository_url;
use super::transport::ApiTransport;
use crate::config::GitHubConfig;
use crate::model::{CheckRun, MergeMethod, PullRequestRef};

/// Characters escaped in a single URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped in a search qualifier value. `/` and `:` stay literal
/// so `author:app/renovate` reads as GitHub expects.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'=')
    .add(b'`');

/// Discovery query result page.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Total matches on the server, which may exceed the page.
    #[serde(default)]
    pub total_count: u64,
    /// Items on this page.
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// One issue-search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    /// Global issue id.
    pub id: u64,
    /// Number within the repository.
    pub number: u64,
    /// Title.
    pub title: String,
    /// Web URL.
    #[serde(default)]
    pub html_url: String,
    /// API URL of the owning repository.
    #[serde(default)]
    pub repository_url: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: String,
    /// Author.
    #[serde(default)]
    pub user: Option<SearchUser>,
    /// Labels.
    #[serde(default)]
    pub labels: Vec<SearchLabel>,
}

/// Author of a search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchUser {
    /// Login.
    pub login: String,
}

/// Label on a search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchLabel {
    /// Label name.
    pub name: String,
}

impl SearchItem {
    /// Converts the hit into a [`PullRequestRef`].
    ///
    /// Returns `None` when the owning repository cannot be read from
    /// `repository_url`.
    #[must_use]
    pub fn into_pull_request_ref(self) -> Option<PullRequestRef> {
        let Some((owner, repo)) = parse_repository_url(&self.repository_url) else {
            debug!(
                id = self.id,
                repository_url = %self.repository_url,
                "Dropping search item without owner/repo"
            );
            return None;
        };

        Some(
            PullRequestRef::builder()
                .id(self.id)
                .number(self.number)
                .title(self.title)
                .owner(owner)
                .repo(repo)
                .created_at(self.created_at)
                .author(self.user.map(|u| u.login).unwrap_or_default())
                .labels(self.labels.into_iter().map(|l| l.name).collect())
                .html_url(self.html_url)
                .build(),
        )
    }
}

/// Pull request detail fields used for enrichment.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestDetail {
    /// Commit count.
    pub commits: u64,
    /// Head branch.
    pub head: HeadRef,
}

/// Head of a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct HeadRef {
    /// Head commit SHA.
    pub sha: String,
}

/// Repository merge capabilities.
///
/// GitHub omits these flags for tokens without push access; missing flags
/// read as disallowed.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RepositoryInfo {
    /// Squash merges allowed.
    #[serde(default)]
    pub allow_squash_merge: bool,
    /// Merge commits allowed.
    #[serde(default)]
    pub allow_merge_commit: bool,
    /// Rebase merges allowed.
    #[serde(default)]
    pub allow_rebase_merge: bool,
}

/// Combined status of a commit.
#[derive(Debug, Clone, Deserialize)]
pub struct CombinedStatus {
    /// `success`, `pending`, `failure` or `error`.
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckRunsResponse {
    #[serde(default)]
    check_runs: Vec<CheckRun>,
}

#[derive(Debug, Serialize)]
struct ClosePullRequest {
    state: &'static str,
}

#[derive(Debug, Serialize)]
struct MergePullRequest {
    merge_method: MergeMethod,
}

/// Typed client over an [`ApiTransport`].
#[derive(Clone)]
pub struct GitHubApi {
    transport: Arc<dyn ApiTransport>,
    base_url: String,
    bot_author: String,
    per_page: u32,
    token: SecretString,
}

impl std::fmt::Debug for GitHubApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubApi")
            .field("base_url", &self.base_url)
            .field("bot_author", &self.bot_author)
            .field("per_page", &self.per_page)
            .finish_non_exhaustive()
    }
}

impl GitHubApi {
    /// Creates a client for the given settings and token.
    #[must_use]
    pub fn new(transport: Arc<dyn ApiTransport>, config: &GitHubConfig, token: SecretString) -> Self {
        Self {
            transport,
            base_url: config.base_url().to_string(),
            bot_author: config.bot_author.clone(),
            per_page: config.page_size(),
            token,
        }
    }

    /// Page size used by the discovery query.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// URL of the discovery query for `org`.
    #[must_use]
    pub fn search_url(&self, org: &str) -> String {
        format!(
            "{}/search/issues?q=is:pr+author:{}+org:{}+is:open&per_page={}",
            self.base_url,
            utf8_percent_encode(&self.bot_author, QUERY_VALUE),
            utf8_percent_encode(org, QUERY_VALUE),
            self.per_page
        )
    }

    fn repo_url(&self, owner: &str, repo: &str) -> String {
        format!(
            "{}/repos/{}/{}",
            self.base_url,
            utf8_percent_encode(owner, PATH_SEGMENT),
            utf8_percent_encode(repo, PATH_SEGMENT)
        )
    }

    fn pull_url(&self, owner: &str, repo: &str, number: u64) -> String {
        format!("{}/pulls/{number}", self.repo_url(owner, repo))
    }

    fn commit_url(&self, owner: &str, repo: &str, sha: &str) -> String {
        format!(
            "{}/commits/{}",
            self.repo_url(owner, repo),
            utf8_percent_encode(sha, PATH_SEGMENT)
        )
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> crate::Result<T> {
        let value = self
            .transport
            .request(Method::GET, url, None, &self.token)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn send(&self, method: Method, url: &str, body: &Value) -> crate::Result<()> {
        self.transport
            .request(method, url, Some(body), &self.token)
            .await?;
        Ok(())
    }

    /// Open PRs authored by the bot in `org`, one page.
    #[instrument(skip(self))]
    pub async fn search_bot_pull_requests(&self, org: &str) -> crate::Result<SearchResponse> {
        let response: SearchResponse = self.get(&self.search_url(org)).await?;
        debug!(
            total_count = response.total_count,
            returned = response.items.len(),
            "Discovery query answered"
        );
        Ok(response)
    }

    /// PR detail (commit count, head SHA).
    #[instrument(skip(self))]
    pub async fn pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> crate::Result<PullRequestDetail> {
        self.get(&self.pull_url(owner, repo, number)).await
    }

    /// Repository merge capability flags.
    #[instrument(skip(self))]
    pub async fn repository(&self, owner: &str, repo: &str) -> crate::Result<RepositoryInfo> {
        self.get(&self.repo_url(owner, repo)).await
    }

    /// Combined status of a commit.
    #[instrument(skip(self))]
    pub async fn combined_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> crate::Result<CombinedStatus> {
        self.get(&format!("{}/status", self.commit_url(owner, repo, sha)))
            .await
    }

    /// Check runs of a commit.
    #[instrument(skip(self))]
    pub async fn check_runs(&self, owner: &str, repo: &str, sha: &str) -> crate::Result<Vec<CheckRun>> {
        let response: CheckRunsResponse = self
            .get(&format!("{}/check-runs", self.commit_url(owner, repo, sha)))
            .await?;
        Ok(response.check_runs)
    }

    /// Closes a PR without merging.
    #[instrument(skip(self))]
    pub async fn close_pull_request(&self, owner: &str, repo: &str, number: u64) -> crate::Result<()> {
        let body = serde_json::to_value(ClosePullRequest { state: "closed" })?;
        self.send(Method::PATCH, &self.pull_url(owner, repo, number), &body)
            .await
    }

    /// Submits an approving review.
    #[instrument(skip(self))]
    pub async fn approve_pull_request(&self, owner: &str, repo: &str, number: u64) -> crate::Result<()> {
        let url = format!("{}/reviews", self.pull_url(owner, repo, number));
        self.send(Method::POST, &url, &json!({ "event": "APPROVE" }))
            .await
    }

    /// Merges a PR with the given method.
    #[instrument(skip(self))]
    pub async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        merge_method: MergeMethod,
    ) -> crate::Result<()> {
        let url = format!("{}/merge", self.pull_url(owner, repo, number));
        let body = serde_json::to_value(MergePullRequest { merge_method })?;
        self.send(Method::PUT, &url, &body).await
    }
}
