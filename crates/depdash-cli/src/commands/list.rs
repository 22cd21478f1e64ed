// SPDX-License-Identifier: Apache-2.0

//! `list`: search and show grouped bot PRs.

use anyhow::Result;
use depdash_core::AppConfig;

use super::types::{GroupRow, ListResult};
use super::{build_dashboard, search};
use crate::cli::OutputContext;

/// Searches the organization and returns its groups.
///
/// With `expand`, every group is toggled open so text output lists its
/// members. With `only`, other groups are dropped from the result.
pub async fn run(
    ctx: &OutputContext,
    config: &AppConfig,
    expand: bool,
    only: Option<&str>,
) -> Result<ListResult> {
    let (mut dashboard, _) = build_dashboard(config)?;
    search(&mut dashboard, ctx).await?;

    if expand {
        let titles: Vec<String> = dashboard.groups().iter().map(|g| g.title.clone()).collect();
        for title in titles {
            dashboard.toggle_group(&title)?;
        }
    }

    let groups = dashboard
        .views()
        .into_iter()
        .filter(|view| only.is_none_or(|title| view.group.title == title))
        .map(GroupRow::from)
        .collect();

    Ok(ListResult {
        organization: dashboard.organization().to_string(),
        total_count: dashboard.total_count(),
        truncated: dashboard.is_truncated(),
        groups,
        source_repository_url: config.ui.source_repository_url().to_string(),
    })
}
