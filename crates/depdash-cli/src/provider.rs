// SPDX-License-Identifier: Apache-2.0

//! CLI-specific `TokenProvider` implementation.
//!
//! Resolution order:
//! 1. `GH_TOKEN` environment variable
//! 2. `GITHUB_TOKEN` environment variable
//! 3. GitHub CLI (`gh auth token`)

use std::process::Command;

use depdash_core::auth::TokenProvider;
use secrecy::SecretString;
use tracing::debug;

/// Where a token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// `GH_TOKEN` or `GITHUB_TOKEN`.
    Environment,
    /// `gh auth token`.
    GhCli,
}

/// CLI implementation of `TokenProvider`.
pub struct CliTokenProvider;

impl TokenProvider for CliTokenProvider {
    fn github_token(&self) -> Option<SecretString> {
        if let Some((token, source)) = resolve_token() {
            debug!(?source, "Resolved GitHub token");
            Some(token)
        } else {
            debug!("No GitHub token found in CLI sources");
            None
        }
    }
}

fn env_token(name: &str) -> Option<SecretString> {
    match std::env::var(name) {
        Ok(token) if !token.trim().is_empty() => {
            debug!("Using token from {name} environment variable");
            Some(SecretString::from(token.trim().to_string()))
        }
        _ => None,
    }
}

fn token_from_gh_cli() -> Option<SecretString> {
    debug!("Attempting to get token from gh CLI");

    match Command::new("gh").args(["auth", "token"]).output() {
        Ok(output) if output.status.success() => {
            let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if token.is_empty() {
                debug!("gh auth token returned empty output");
                None
            } else {
                Some(SecretString::from(token))
            }
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(
                status = ?output.status,
                stderr = %stderr.trim(),
                "gh auth token failed"
            );
            None
        }
        Err(e) => {
            debug!(error = %e, "Failed to execute gh command");
            None
        }
    }
}

/// Resolves a GitHub token and reports its source.
pub fn resolve_token() -> Option<(SecretString, TokenSource)> {
    env_token("GH_TOKEN")
        .or_else(|| env_token("GITHUB_TOKEN"))
        .map(|token| (token, TokenSource::Environment))
        .or_else(|| token_from_gh_cli().map(|token| (token, TokenSource::GhCli)))
}
