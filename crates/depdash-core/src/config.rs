// SPDX-License-Identifier: Apache-2.0

//! Configuration management for depdash.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables (prefix: `DEPDASH_`)
//! 2. Config file: `~/.config/depdash/config.toml`
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Watch Dependabot PRs instead of Renovate ones
//! DEPDASH_GITHUB__BOT_AUTHOR=app/dependabot depdash list --org acme
//! ```

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::DepdashError;

/// Largest page GitHub's search API returns.
pub const MAX_PER_PAGE: u32 = 100;

/// Fallback link to the dashboard's own source.
pub const DEFAULT_SOURCE_REPOSITORY_URL: &str =
    "https://github.com/dependency-dashboard/renovate-dashboard";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// User preferences.
    pub user: UserConfig,
    /// GitHub API settings.
    pub github: GitHubConfig,
    /// UI preferences.
    pub ui: UiConfig,
}

/// User preferences.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct UserConfig {
    /// Organization to search when none is given on the command line.
    pub default_org: Option<String>,
}

/// GitHub API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base URL.
    pub api_url: String,
    /// Author qualifier of the update bot (e.g. `app/renovate`).
    pub bot_author: String,
    /// Page size of the discovery query.
    pub per_page: u32,
    /// API request timeout in seconds.
    pub api_timeout_seconds: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            bot_author: "app/renovate".to_string(),
            per_page: MAX_PER_PAGE,
            api_timeout_seconds: 30,
        }
    }
}

impl GitHubConfig {
    /// Page size clamped to what the search API accepts.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

/// UI preferences.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Ask before closing or merging.
    pub confirm_before_action: bool,
    /// Link to the dashboard's source repository.
    pub source_repository_url: Option<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            confirm_before_action: true,
            source_repository_url: None,
        }
    }
}

impl UiConfig {
    /// Configured source link, or the default when unset or blank.
    #[must_use]
    pub fn source_repository_url(&self) -> &str {
        self.source_repository_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_SOURCE_REPOSITORY_URL)
    }
}

/// Returns the depdash configuration directory.
///
/// Respects the `XDG_CONFIG_HOME` environment variable if set,
/// otherwise defaults to `~/.config/depdash`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return PathBuf::from(xdg_config).join("depdash");
    }
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".config")
        .join("depdash")
}

/// Returns the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load application configuration.
///
/// Loads from config file (if exists) and environment variables.
/// Environment variables use the prefix `DEPDASH_` and double underscore
/// for nested keys (e.g., `DEPDASH_GITHUB__BOT_AUTHOR`).
///
/// # Errors
///
/// Returns `DepdashError::Config` if the config file exists but is invalid.
pub fn load_config() -> Result<AppConfig, DepdashError> {
    let config_path = config_file_path();

    let config = Config::builder()
        // Load from config file (optional - may not exist)
        .add_source(File::with_name(config_path.to_string_lossy().as_ref()).required(false))
        // Override with environment variables
        .add_source(
            Environment::with_prefix("DEPDASH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    Ok(app_config)
}
