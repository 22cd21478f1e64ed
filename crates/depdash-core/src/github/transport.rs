// SPDX-License-Identifier: Apache-2.0

//! Raw JSON request primitive.
//!
//! Every remote call goes through [`ApiTransport::request`]. The production
//! [`HttpTransport`] talks to GitHub with reqwest; tests swap in a scripted
//! double.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::GitHubConfig;
use crate::error::DepdashError;

/// Media type requested from the REST API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

const USER_AGENT: &str = concat!("depdash/", env!("CARGO_PKG_VERSION"));

/// Authenticated JSON request function.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Sends a request and returns the parsed JSON payload.
    ///
    /// A `204 No Content` answer yields [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`DepdashError::Api`] for non-2xx responses,
    /// [`DepdashError::Network`] when the request could not be sent and
    /// [`DepdashError::UnexpectedResponse`] when the body is not JSON.
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: &SecretString,
    ) -> crate::Result<Value>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Creates a transport from the GitHub settings.
    pub fn from_config(config: &GitHubConfig) -> crate::Result<Self> {
        Self::new(Duration::from_secs(config.api_timeout_seconds))
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    #[instrument(skip(self, body, token))]
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: &SecretString,
    ) -> crate::Result<Value> {
        let mut req = self
            .client
            .request(method, url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(AUTHORIZATION, format!("token {}", token.expose_secret()));

        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "GitHub response");

        decode_response(status, &text)
    }
}

/// Turns a status code and body into the transport result.
pub(crate) fn decode_response(status: StatusCode, body: &str) -> crate::Result<Value> {
    if !status.is_success() {
        return Err(api_error(status.as_u16(), body));
    }
    if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

/// Builds the error for a non-2xx answer.
///
/// Uses the body's `message` field when there is one.
pub(crate) fn api_error(status: u16, body: &str) -> DepdashError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("API request failed with status: {status}"));

    DepdashError::Api { status, message }
}
