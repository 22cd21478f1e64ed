// SPDX-License-Identifier: Apache-2.0

//! Scripted transport and fixtures shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Method;
use secrecy::SecretString;
use serde_json::{Value, json};

use crate::config::GitHubConfig;
use crate::error::DepdashError;
use crate::github::api::GitHubApi;
use crate::github::transport::ApiTransport;

pub const TEST_BASE_URL: &str = "https://api.github.test";

/// One request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

enum Reply {
    Json(Value),
    Error { status: u16, message: String },
}

/// Answers requests from a route table and records every call.
///
/// Unrouted requests answer `404 Not Found`.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<(Method, String, Reply)>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: Method, path: &str, value: Value) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((method, path.to_string(), Reply::Json(value)));
        self
    }

    pub fn fail(self, method: Method, path: &str, status: u16, message: &str) -> Self {
        self.routes.lock().unwrap().push((
            method,
            path.to_string(),
            Reply::Error {
                status,
                message: message.to_string(),
            },
        ));
        self
    }

    /// Routes the four enrichment reads of one PR.
    pub fn enrichable(
        self,
        owner: &str,
        repo: &str,
        number: u64,
        commits: u64,
        combined: &str,
        check_runs: Value,
    ) -> Self {
        let sha = format!("sha-{number}");
        self.on(
            Method::GET,
            &format!("/repos/{owner}/{repo}/pulls/{number}"),
            json!({"number": number, "commits": commits, "head": {"sha": sha}}),
        )
        .on(
            Method::GET,
            &format!("/repos/{owner}/{repo}"),
            json!({"allow_squash_merge": true, "allow_merge_commit": true, "allow_rebase_merge": true}),
        )
        .on(
            Method::GET,
            &format!("/repos/{owner}/{repo}/commits/{sha}/status"),
            json!({"state": combined}),
        )
        .on(
            Method::GET,
            &format!("/repos/{owner}/{repo}/commits/{sha}/check-runs"),
            json!({"total_count": check_runs.as_array().map_or(0, Vec::len), "check_runs": check_runs}),
        )
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_with(&self, method: &Method) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == *method)
            .collect()
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        _token: &SecretString,
    ) -> crate::Result<Value> {
        let path = url.strip_prefix(TEST_BASE_URL).unwrap_or(url).to_string();
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.clone(),
            path: path.clone(),
            body: body.cloned(),
        });

        let routes = self.routes.lock().unwrap();
        match routes.iter().find(|(m, p, _)| *m == method && *p == path) {
            Some((_, _, Reply::Json(value))) => Ok(value.clone()),
            Some((_, _, Reply::Error { status, message })) => Err(DepdashError::Api {
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

pub fn test_config() -> GitHubConfig {
    GitHubConfig {
        api_url: TEST_BASE_URL.to_string(),
        ..GitHubConfig::default()
    }
}

pub fn test_token() -> SecretString {
    SecretString::from("ghp_test".to_string())
}

pub fn test_api(transport: Arc<MockTransport>) -> GitHubApi {
    GitHubApi::new(transport, &test_config(), test_token())
}

/// A search hit as GitHub returns it.
pub fn search_item(id: u64, number: u64, title: &str, owner: &str, repo: &str) -> Value {
    json!({
        "id": id,
        "number": number,
        "title": title,
        "html_url": format!("https://github.com/{owner}/{repo}/pull/{number}"),
        "repository_url": format!("https://api.github.com/repos/{owner}/{repo}"),
        "created_at": "2024-05-01T00:00:00Z",
        "user": {"login": "renovate[bot]"},
        "labels": []
    })
}

pub fn search_response(items: Vec<Value>) -> Value {
    json!({"total_count": items.len(), "incomplete_results": false, "items": items})
}

pub fn search_path(org: &str) -> String {
    format!("/search/issues?q=is:pr+author:app/renovate+org:{org}+is:open&per_page=100")
}

pub fn check_run(status: &str, conclusion: Option<&str>) -> Value {
    json!({"id": 1, "name": "ci", "status": status, "conclusion": conclusion, "html_url": null})
}
