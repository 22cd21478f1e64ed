// SPDX-License-Identifier: Apache-2.0

//! GitHub integration module.
//!
//! [`transport`] moves raw JSON over HTTP, [`api`] turns it into typed
//! endpoint calls. The parsers below handle the repository and pull request
//! references found in search results and typed on the command line.

use tracing::debug;

use crate::error::DepdashError;

pub mod api;
pub mod transport;

/// Extracts `(owner, repo)` from a search item's `repository_url`.
///
/// The last path segment is the repository and the one before it the
/// owner (`https://api.github.com/repos/acme/widgets` gives
/// `("acme", "widgets")`). Returns `None` when either is missing or empty.
#[must_use]
pub fn parse_repository_url(url: &str) -> Option<(String, String)> {
    let mut segments = url.rsplit('/');
    let repo = segments.next()?;
    let owner = segments.next()?;
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

/// Parses an owner/repo string to extract owner and repo.
///
/// Validates format: exactly one `/`, non-empty parts.
///
/// # Errors
///
/// Returns [`DepdashError::InvalidReference`] if the format is invalid.
pub fn parse_owner_repo(s: &str) -> crate::Result<(String, String)> {
    match s.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(DepdashError::InvalidReference {
            message: format!(
                "Invalid owner/repo format.\n\
                 Expected: owner/repo\n\
                 Got: {s}"
            ),
        }),
    }
}

/// Parses a pull request reference into `(owner, repo, number)`.
///
/// Supports:
/// - Full URL: `https://github.com/owner/repo/pull/123`
/// - Short form: `owner/repo#123`
///
/// # Errors
///
/// Returns [`DepdashError::InvalidReference`] if the format is invalid.
pub fn parse_pr_reference(input: &str) -> crate::Result<(String, String, u64)> {
    let input = input.trim();

    if input.starts_with("https://") || input.starts_with("http://") {
        // Drop fragments and query params
        let clean_url = input.split(['#', '?']).next().unwrap_or(input);
        let parts: Vec<&str> = clean_url.trim_end_matches('/').split('/').collect();

        // ["https:", "", "github.com", "owner", "repo", "pull", "123"]
        if parts.len() != 7 || parts[5] != "pull" || parts[3].is_empty() || parts[4].is_empty() {
            return Err(invalid_pr_reference(input));
        }
        let number = parse_number(parts[6], input)?;

        debug!(owner = parts[3], repo = parts[4], number, "Parsed pull request URL");
        return Ok((parts[3].to_string(), parts[4].to_string(), number));
    }

    if let Some((owner_repo, number)) = input.split_once('#') {
        let (owner, repo) = parse_owner_repo(owner_repo)?;
        let number = parse_number(number, input)?;

        debug!(owner = %owner, repo = %repo, number, "Parsed short-form pull request reference");
        return Ok((owner, repo, number));
    }

    Err(invalid_pr_reference(input))
}

fn parse_number(raw: &str, input: &str) -> crate::Result<u64> {
    raw.parse().map_err(|_| DepdashError::InvalidReference {
        message: format!(
            "Invalid pull request number '{raw}'.\n\
             Got: {input}"
        ),
    })
}

fn invalid_pr_reference(input: &str) -> DepdashError {
    DepdashError::InvalidReference {
        message: format!(
            "Invalid pull request reference format.\n\
             Expected one of:\n\
             - Full URL: https://github.com/owner/repo/pull/123\n\
             - Short form: owner/repo#123\n\
             Got: {input}"
        ),
    }
}
