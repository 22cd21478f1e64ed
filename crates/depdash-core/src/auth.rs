// SPDX-License-Identifier: Apache-2.0

//! Token provider abstraction for credential resolution.
//!
//! Front ends implement [`TokenProvider`] to hand the dashboard a GitHub
//! personal access token from wherever they keep it (environment, the
//! GitHub CLI, a form field).

use secrecy::SecretString;

/// Provides the GitHub credential used for every API call.
pub trait TokenProvider: Send + Sync {
    /// Retrieves the GitHub API token.
    ///
    /// Returns `None` if no token is available from any source.
    fn github_token(&self) -> Option<SecretString>;
}

/// Provider holding a token entered up front.
#[derive(Debug, Default, Clone)]
pub struct StaticTokenProvider {
    token: Option<SecretString>,
}

impl StaticTokenProvider {
    /// Wraps a token; blank input counts as no token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let token = token.trim();
        Self {
            token: (!token.is_empty()).then(|| SecretString::from(token.to_string())),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn github_token(&self) -> Option<SecretString> {
        self.token.clone()
    }
}
