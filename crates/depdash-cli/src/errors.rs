// SPDX-License-Identifier: Apache-2.0

//! CLI-specific error formatting with user-friendly hints.
//!
//! Downcasts `anyhow::Error` to `DepdashError` and appends a hint for the
//! cases a user can fix. Other errors print their full context chain.

use anyhow::Error;
use depdash_core::error::DepdashError;

/// Formats an error for CLI display with helpful hints.
pub fn format_error(error: &Error) -> String {
    let Some(depdash_err) = error.downcast_ref::<DepdashError>() else {
        return format!("{error:#}");
    };

    match depdash_err {
        DepdashError::MissingCredentials => format!(
            "{depdash_err}\n\nTip: Pass --org (or set user.default_org) and export GH_TOKEN, \
             or log in with `gh auth login`."
        ),
        DepdashError::Api { status: 401, .. } => format!(
            "{depdash_err}\n\nTip: The GitHub token was rejected. Check GH_TOKEN or `gh auth status`."
        ),
        DepdashError::Api { status: 403, .. } => format!(
            "{depdash_err}\n\nTip: The token may lack the `repo` scope, or the rate limit was hit."
        ),
        DepdashError::Api { status: 405, .. } => format!(
            "{depdash_err}\n\nTip: Branch protection may be blocking the merge. Check the PR on GitHub."
        ),
        DepdashError::Network(_) => {
            format!("{depdash_err}\n\nTip: Check your internet connection and try again.")
        }
        DepdashError::Config { .. } => format!(
            "{depdash_err}\n\nTip: Check your config file at {}",
            depdash_core::config::config_file_path().display()
        ),
        DepdashError::UnknownGroup { .. } => {
            format!("{depdash_err}\n\nTip: Run `depdash list` to see the current group titles.")
        }
        DepdashError::InvalidReference { .. } => format!(
            "{depdash_err}\n\nTip: Use owner/repo#123 or https://github.com/owner/repo/pull/123"
        ),
        _ => depdash_err.to_string(),
    }
}
