// SPDX-License-Identifier: Apache-2.0

//! End-to-end flows through the public API against a scripted transport:
//! search, single and group actions, then the workflow summary.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use depdash_core::{
    ActionState, AggregateStatus, ApiTransport, BulkOutcome, CiStatus, Dashboard, DepdashError,
    GitHubConfig, MergeMethod, WorkflowSummary, WorkflowSummaryAggregator,
};
use reqwest::Method;
use secrecy::SecretString;
use serde_json::{Value, json};

const BASE: &str = "https://ghe.example.test/api/v3";

#[derive(Debug, Clone)]
struct Call {
    method: Method,
    path: String,
    body: Option<Value>,
}

/// Route table keyed by method and path; unrouted calls answer 404.
#[derive(Default)]
struct ScriptedTransport {
    routes: Mutex<Vec<(Method, String, Result<Value, (u16, String)>)>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    fn ok(self, method: Method, path: &str, value: Value) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((method, path.to_string(), Ok(value)));
        self
    }

    fn err(self, method: Method, path: &str, status: u16, message: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((method, path.to_string(), Err((status, message.to_string()))));
        self
    }

    fn pr(self, owner: &str, repo: &str, number: u64, commits: u64, checks: Value) -> Self {
        let sha = format!("head{number}");
        self.ok(
            Method::GET,
            &format!("/repos/{owner}/{repo}/pulls/{number}"),
            json!({"commits": commits, "head": {"sha": sha}}),
        )
        .ok(
            Method::GET,
            &format!("/repos/{owner}/{repo}"),
            json!({"allow_squash_merge": true, "allow_merge_commit": false, "allow_rebase_merge": true}),
        )
        .ok(
            Method::GET,
            &format!("/repos/{owner}/{repo}/commits/{sha}/status"),
            json!({"state": "success"}),
        )
        .ok(
            Method::GET,
            &format!("/repos/{owner}/{repo}/commits/{sha}/check-runs"),
            json!({"check_runs": checks}),
        )
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method != Method::GET)
            .collect()
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        _token: &SecretString,
    ) -> depdash_core::Result<Value> {
        let path = url.strip_prefix(BASE).unwrap_or(url).to_string();
        self.calls.lock().unwrap().push(Call {
            method: method.clone(),
            path: path.clone(),
            body: body.cloned(),
        });

        let routes = self.routes.lock().unwrap();
        match routes.iter().find(|(m, p, _)| *m == method && *p == path) {
            Some((_, _, Ok(value))) => Ok(value.clone()),
            Some((_, _, Err((status, message)))) => Err(DepdashError::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Err(DepdashError::Api {
                status: 404,
                message: "Not Found".to_string(),
            }),
        }
    }
}

fn config() -> GitHubConfig {
    GitHubConfig {
        api_url: format!("{BASE}/"),
        ..GitHubConfig::default()
    }
}

fn item(id: u64, number: u64, title: &str, repo: &str) -> Value {
    json!({
        "id": id,
        "number": number,
        "title": title,
        "html_url": format!("https://github.com/acme/{repo}/pull/{number}"),
        "repository_url": format!("{BASE}/repos/acme/{repo}"),
        "created_at": "2024-05-01T00:00:00Z",
        "user": {"login": "renovate[bot]"},
        "labels": [{"name": "dependencies"}]
    })
}

const SEARCH: &str = "/search/issues?q=is:pr+author:app/renovate+org:acme+is:open&per_page=100";

fn passing() -> Value {
    json!([{"id": 1, "name": "build", "status": "completed", "conclusion": "success", "html_url": null}])
}

fn failing() -> Value {
    json!([
        {"id": 1, "name": "build", "status": "completed", "conclusion": "failure", "html_url": null},
        {"id": 2, "name": "lint", "status": "completed", "conclusion": "success", "html_url": null}
    ])
}

/// Two groups: "Update A" in `one` (passing) and `three` (failing),
/// "Update B" in `two` (passing).
fn org() -> ScriptedTransport {
    ScriptedTransport::default()
        .ok(
            Method::GET,
            SEARCH,
            json!({
                "total_count": 3,
                "items": [
                    item(1, 10, "Update A", "one"),
                    item(2, 20, "Update B", "two"),
                    item(3, 30, "Update A", "three")
                ]
            }),
        )
        .pr("acme", "one", 10, 1, passing())
        .pr("acme", "two", 20, 3, passing())
        .pr("acme", "three", 30, 1, failing())
}

fn dashboard(transport: &Arc<ScriptedTransport>) -> Dashboard {
    let mut dashboard = Dashboard::new(transport.clone(), config());
    dashboard.set_organization("acme");
    dashboard.set_token(Some(SecretString::from("ghp_test")));
    dashboard
}

#[tokio::test]
async fn search_builds_groups_in_first_seen_order() {
    let transport = Arc::new(org());
    let mut dashboard = dashboard(&transport);

    dashboard.search().await.unwrap();

    let titles: Vec<&str> = dashboard.groups().iter().map(|g| g.title.as_str()).collect();
    assert_eq!(titles, vec!["Update A", "Update B"]);

    let a = dashboard.group("Update A").unwrap();
    assert_eq!(a.pr_ids, vec![1, 3]);
    assert_eq!(a.aggregate_status(), AggregateStatus::Failure);
    assert_eq!(
        a.workflow_summary(),
        WorkflowSummary {
            success: 1,
            pending: 0,
            failed: 1
        }
    );

    let three = dashboard.pull_request(3).unwrap();
    assert_eq!(three.ci_status, CiStatus::Failure);
    assert_eq!(three.workflow_status, CiStatus::Failure);
    assert_eq!(three.reference.labels, vec!["dependencies".to_string()]);
    assert!(dashboard.pull_request(2).unwrap().is_modified());
}

#[tokio::test]
async fn merge_group_skips_failing_members() {
    let transport = Arc::new(
        org()
            .ok(Method::POST, "/repos/acme/one/pulls/10/reviews", json!({}))
            .ok(Method::PUT, "/repos/acme/one/pulls/10/merge", json!({"merged": true})),
    );
    let mut dashboard = dashboard(&transport);
    dashboard.search().await.unwrap();

    let result = dashboard.approve_and_merge_group("Update A").await.unwrap();

    assert_eq!(result.succeeded, 1);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.failed, 0);
    assert_eq!(
        result.outcomes[0],
        ("acme/one#10".to_string(), BulkOutcome::Success(MergeMethod::Rebase))
    );

    let mutations = transport.mutations();
    assert_eq!(mutations.len(), 2);
    assert!(mutations.iter().all(|c| c.path.starts_with("/repos/acme/one/")));
    assert_eq!(mutations[1].body, Some(json!({"merge_method": "rebase"})));

    // the failing member stays, the group with it
    assert_eq!(dashboard.group("Update A").unwrap().pr_ids, vec![3]);
    assert_eq!(dashboard.refresh_tick(), 2);
}

#[tokio::test]
async fn merge_group_with_only_failing_members_makes_no_calls() {
    let transport = Arc::new(
        ScriptedTransport::default()
            .ok(
                Method::GET,
                SEARCH,
                json!({"total_count": 2, "items": [item(1, 10, "Update A", "one"), item(2, 20, "Update A", "two")]}),
            )
            .pr("acme", "one", 10, 1, failing())
            .pr("acme", "two", 20, 1, failing()),
    );
    let mut dashboard = dashboard(&transport);
    dashboard.search().await.unwrap();
    let reads = transport.calls().len();

    let err = dashboard.approve_and_merge_group("Update A").await.unwrap_err();

    assert!(matches!(err, DepdashError::NoEligiblePullRequests { .. }));
    assert_eq!(transport.calls().len(), reads);
    assert_eq!(
        dashboard.error(),
        Some("All PRs in this group have failing workflows and cannot be merged.")
    );
    let members = dashboard.members("Update A");
    assert_eq!(members.len(), 2);
    assert!(members.iter().all(|pr| pr.action == ActionState::Idle));
    assert_eq!(dashboard.refresh_tick(), 1);
}

#[tokio::test]
async fn closing_members_shrinks_then_removes_group() {
    let transport = Arc::new(
        org()
            .ok(Method::PATCH, "/repos/acme/one/pulls/10", json!({"state": "closed"}))
            .ok(Method::PATCH, "/repos/acme/three/pulls/30", json!({"state": "closed"})),
    );
    let mut dashboard = dashboard(&transport);
    dashboard.search().await.unwrap();

    dashboard.close_pr(1).await.unwrap();
    let a = dashboard.group("Update A").unwrap();
    assert_eq!(a.pr_ids, vec![3]);
    // aggregates follow the remaining member
    assert_eq!(a.workflow_summary().success, 0);
    assert_eq!(a.workflow_summary().failed, 1);

    dashboard.close_pr(3).await.unwrap();
    assert!(dashboard.group("Update A").is_none());
    assert_eq!(dashboard.groups().len(), 1);
    assert_eq!(dashboard.refresh_tick(), 3);
}

#[tokio::test]
async fn failed_close_keeps_pr_for_retry() {
    let transport = Arc::new(org().err(
        Method::PATCH,
        "/repos/acme/two/pulls/20",
        403,
        "Resource not accessible by integration",
    ));
    let mut dashboard = dashboard(&transport);
    dashboard.search().await.unwrap();

    assert!(dashboard.close_pr(2).await.is_err());

    assert_eq!(
        dashboard.error(),
        Some("Failed to close PR #20: Resource not accessible by integration")
    );
    let pr = dashboard.pull_request(2).unwrap();
    assert!(!pr.is_processing());
    assert_eq!(dashboard.group("Update B").unwrap().pr_ids, vec![2]);
}

#[tokio::test]
async fn error_slot_persists_until_next_search() {
    let transport = Arc::new(
        org()
            .err(Method::PATCH, "/repos/acme/two/pulls/20", 500, "boom")
            .ok(Method::PATCH, "/repos/acme/one/pulls/10", json!({})),
    );
    let mut dashboard = dashboard(&transport);
    dashboard.search().await.unwrap();

    let _ = dashboard.close_pr(2).await;
    dashboard.close_pr(1).await.unwrap();
    assert_eq!(dashboard.error(), Some("Failed to close PR #20: boom"));

    dashboard.search().await.unwrap();
    assert!(dashboard.error().is_none());
}

#[tokio::test]
async fn summary_runs_after_search_tick() {
    let transport = Arc::new(org());
    let mut dashboard = dashboard(&transport);
    let aggregator = WorkflowSummaryAggregator::new(transport.clone(), config());
    let token = SecretString::from("ghp_test");

    let before = aggregator
        .summarize(Some("acme"), Some(&token), dashboard.refresh_tick())
        .await;
    assert_eq!(before, WorkflowSummary::default());
    assert!(transport.calls().is_empty());

    dashboard.search().await.unwrap();
    let after = aggregator
        .summarize(Some("acme"), Some(&token), dashboard.refresh_tick())
        .await;

    assert_eq!(
        after,
        WorkflowSummary {
            success: 2,
            pending: 0,
            failed: 1
        }
    );
}
