// SPDX-License-Identifier: Apache-2.0

//! Error types for depdash.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Application code should use `anyhow::Result` for top-level error handling.

use thiserror::Error;

/// Errors that can occur during depdash operations.
#[derive(Error, Debug)]
pub enum DepdashError {
    /// GitHub answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// HTTP status code returned by GitHub.
        status: u16,
        /// Message from the error body, or a generic status message.
        message: String,
    },

    /// Network/HTTP error from reqwest.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response payload did not have the expected shape.
    #[error("Unexpected response from GitHub: {message}")]
    UnexpectedResponse {
        /// Description of the decoding failure.
        message: String,
    },

    /// None of the merge strategies allowed by the repository fit the PR.
    #[error("No suitable merge method available for PR #{number}")]
    NoSuitableMergeMethod {
        /// Pull request number.
        number: u64,
    },

    /// Merge attempted on a PR whose workflow is failing.
    #[error("Cannot merge PR with failing workflow checks")]
    FailingWorkflow {
        /// Pull request number.
        number: u64,
    },

    /// Every member of a group has a failing workflow.
    #[error("All PRs in this group have failing workflows and cannot be merged.")]
    NoEligiblePullRequests {
        /// Title of the group.
        title: String,
    },

    /// Organization or token missing.
    #[error("Organization and Personal Access Token are required.")]
    MissingCredentials,

    /// Action triggered against a PR that is not part of the current state.
    #[error("Pull request {id} is not part of the current dashboard")]
    UnknownPullRequest {
        /// Pull request id.
        id: u64,
    },

    /// Action triggered against a group that is not part of the current state.
    #[error("No group titled '{title}' in the current dashboard")]
    UnknownGroup {
        /// Group title.
        title: String,
    },

    /// Malformed repository or pull request reference.
    #[error("{message}")]
    InvalidReference {
        /// What was wrong and what was expected.
        message: String,
    },

    /// Configuration file error.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },
}

impl DepdashError {
    /// Returns true for product-policy failures, as opposed to transport
    /// or decoding failures.
    #[must_use]
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            DepdashError::NoSuitableMergeMethod { .. }
                | DepdashError::FailingWorkflow { .. }
                | DepdashError::NoEligiblePullRequests { .. }
        )
    }
}

impl From<serde_json::Error> for DepdashError {
    fn from(err: serde_json::Error) -> Self {
        DepdashError::UnexpectedResponse {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for DepdashError {
    fn from(err: config::ConfigError) -> Self {
        DepdashError::Config {
            message: err.to_string(),
        }
    }
}
