// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # depdash Core
//!
//! Core library for depdash: a dashboard over the open dependency-update
//! pull requests an automation bot keeps across an organization.
//!
//! This crate provides reusable components for:
//! - Discovery of bot PRs and grouping by title
//! - Enrichment with repository merge settings, combined status and check runs
//! - Group-level aggregate status and workflow counts
//! - Single and group close / approve-and-merge actions
//! - An independent organization-wide workflow summary
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use depdash_core::{Dashboard, HttpTransport, load_config};
//! use secrecy::SecretString;
//!
//! # async fn example() -> depdash_core::Result<()> {
//! let config = load_config()?;
//! let transport = Arc::new(HttpTransport::from_config(&config.github)?);
//!
//! let mut dashboard = Dashboard::new(transport, config.github);
//! dashboard.set_organization("acme");
//! dashboard.set_token(Some(SecretString::from("ghp_...".to_string())));
//! dashboard.search().await?;
//!
//! for group in dashboard.groups() {
//!     println!("{} ({} PRs, {})", group.title, group.len(), group.aggregate_status());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`dashboard`] - Controller owning state, search and bulk actions
//! - [`store`] - PR arena and title-keyed groups
//! - [`search`] / [`enrich`] - Discovery and per-PR enrichment
//! - [`status`] / [`merge`] - Pure status folds and merge method policy
//! - [`summary`] - Organization-wide workflow counts
//! - [`github`] - Transport and typed REST endpoints
//! - [`config`] - Configuration loading and paths
//! - [`error`] - Error types

// ============================================================================
// Authentication
// ============================================================================

pub use auth::{StaticTokenProvider, TokenProvider};

// ============================================================================
// Error Handling
// ============================================================================

pub use error::DepdashError;

/// Convenience Result type for depdash operations.
///
/// This is equivalent to `std::result::Result<T, DepdashError>`.
pub type Result<T> = std::result::Result<T, DepdashError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AppConfig, GitHubConfig, UiConfig, UserConfig, config_dir, config_file_path, load_config,
};

// ============================================================================
// Domain Model
// ============================================================================

pub use model::{
    ActionState, AggregateStatus, CheckConclusion, CheckRun, CheckRunStatus, CiStatus,
    EnrichedPullRequest, MergeMethod, PullRequestRef, WorkflowSummary, format_conclusion,
};
pub use status::{aggregate_status, map_combined_status, reconcile_check_runs, summarize_workflows};
pub use merge::resolve_merge_method;

// ============================================================================
// GitHub Integration
// ============================================================================

pub use github::api::GitHubApi;
pub use github::transport::{ApiTransport, HttpTransport};
pub use github::{parse_owner_repo, parse_pr_reference, parse_repository_url};

// ============================================================================
// Dashboard
// ============================================================================

pub use bulk::{BulkOutcome, BulkResult};
pub use dashboard::{Dashboard, DashboardEvent};
pub use search::{SearchOutcome, discover};
pub use store::{GroupView, PrGroup, PrStore};
pub use summary::WorkflowSummaryAggregator;

// ============================================================================
// Utilities
// ============================================================================

pub use utils::{format_date, format_relative_time, parse_and_format_relative_time, truncate};

// ============================================================================
// Modules
// ============================================================================

pub mod auth;
pub mod bulk;
pub mod config;
pub mod dashboard;
pub mod enrich;
pub mod error;
pub mod github;
pub mod merge;
pub mod model;
pub mod search;
pub mod status;
pub mod store;
pub mod summary;
pub mod utils;

#[cfg(test)]
mod testing;
