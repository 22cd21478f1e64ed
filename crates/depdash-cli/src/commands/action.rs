// SPDX-License-Identifier: Apache-2.0

//! Close and merge commands, for single PRs and whole groups.
//!
//! Every action starts with a fresh search so that it only ever touches
//! open PRs authored by the configured bot.

use anyhow::{Result, bail};
use console::style;
use depdash_core::{AppConfig, Dashboard, MergeMethod, parse_pr_reference};

use super::types::{ActionKind, ActionResult, GroupActionResult};
use super::{build_dashboard, confirm, maybe_spinner, search};
use crate::cli::OutputContext;

/// Searches the PR's owner and returns the dashboard with the PR's id.
async fn locate(
    ctx: &OutputContext,
    config: &AppConfig,
    reference: &str,
) -> Result<(Dashboard, u64, String)> {
    let (owner, repo, number) = parse_pr_reference(reference)?;
    let (mut dashboard, _) = build_dashboard(config)?;
    dashboard.set_organization(owner.clone());
    search(&mut dashboard, ctx).await?;

    let Some(pr) = dashboard.find_pull_request(&owner, &repo, number) else {
        bail!(
            "{owner}/{repo}#{number} is not an open PR by {} in {owner}",
            config.github.bot_author
        );
    };
    let title = pr.title().to_string();
    let id = pr.id();
    Ok((dashboard, id, title))
}

/// Closes one PR. Returns `None` when the user declines.
pub async fn close(
    ctx: &OutputContext,
    config: &AppConfig,
    reference: &str,
    yes: bool,
) -> Result<Option<ActionResult>> {
    let (mut dashboard, id, title) = locate(ctx, config, reference).await?;
    let label = reference_label(&dashboard, id);

    if !confirm(ctx, config, yes, &format!("Close {label} \"{title}\"?"))? {
        return Ok(None);
    }

    let spinner = maybe_spinner(ctx, &format!("Closing {label}..."));
    let result = dashboard.close_pr(id).await;
    if let Some(s) = spinner {
        s.finish_and_clear();
    }
    result?;

    Ok(Some(ActionResult {
        reference: label,
        title,
        action: ActionKind::Closed,
        merge_method: None,
    }))
}

/// Approves and merges one PR. Returns `None` when the user declines.
pub async fn merge(
    ctx: &OutputContext,
    config: &AppConfig,
    reference: &str,
    yes: bool,
) -> Result<Option<ActionResult>> {
    let (mut dashboard, id, title) = locate(ctx, config, reference).await?;
    let label = reference_label(&dashboard, id);

    if !confirm(
        ctx,
        config,
        yes,
        &format!("Approve and merge {label} \"{title}\"?"),
    )? {
        return Ok(None);
    }

    let spinner = maybe_spinner(ctx, &format!("Merging {label}..."));
    let result = dashboard.approve_and_merge_pr(id).await;
    if let Some(s) = spinner {
        s.finish_and_clear();
    }
    let method = result?;

    Ok(Some(ActionResult {
        reference: label,
        title,
        action: ActionKind::Merged,
        merge_method: Some(method),
    }))
}

/// Closes every member of a group. Returns `None` when the user declines.
pub async fn close_group(
    ctx: &OutputContext,
    config: &AppConfig,
    title: &str,
    yes: bool,
) -> Result<Option<GroupActionResult<()>>> {
    let (mut dashboard, _) = build_dashboard(config)?;
    search(&mut dashboard, ctx).await?;
    let members = group_size(&dashboard, title)?;

    if !confirm(
        ctx,
        config,
        yes,
        &format!("Close all {members} PRs titled \"{title}\"?"),
    )? {
        return Ok(None);
    }

    let spinner = maybe_spinner(ctx, &format!("Closing {members} PRs..."));
    let result = dashboard.close_group(title).await;
    if let Some(s) = spinner {
        s.finish_and_clear();
    }
    let result = result?;

    Ok(Some(GroupActionResult {
        title: title.to_string(),
        action: ActionKind::Closed,
        group_removed: dashboard.group(title).is_none(),
        result,
    }))
}

/// Approves and merges every eligible member of a group. Returns `None`
/// when the user declines.
pub async fn merge_group(
    ctx: &OutputContext,
    config: &AppConfig,
    title: &str,
    yes: bool,
) -> Result<Option<GroupActionResult<MergeMethod>>> {
    let (mut dashboard, _) = build_dashboard(config)?;
    search(&mut dashboard, ctx).await?;
    let members = group_size(&dashboard, title)?;

    if ctx.is_text() && !ctx.quiet {
        let failing = dashboard
            .group(title)
            .map_or(0, |g| g.workflow_summary().failed);
        if failing > 0 && failing < members {
            println!(
                "{}",
                style(format!(
                    "{failing} of {members} PRs have failing workflows and will be skipped."
                ))
                .yellow()
            );
        }
    }

    if !confirm(
        ctx,
        config,
        yes,
        &format!("Approve and merge the PRs titled \"{title}\"?"),
    )? {
        return Ok(None);
    }

    let spinner = maybe_spinner(ctx, &format!("Merging {members} PRs..."));
    let result = dashboard.approve_and_merge_group(title).await;
    if let Some(s) = spinner {
        s.finish_and_clear();
    }
    let result = result?;

    Ok(Some(GroupActionResult {
        title: title.to_string(),
        action: ActionKind::Merged,
        group_removed: dashboard.group(title).is_none(),
        result,
    }))
}

fn group_size(dashboard: &Dashboard, title: &str) -> Result<usize> {
    match dashboard.group(title) {
        Some(group) => Ok(group.len()),
        None => Err(depdash_core::DepdashError::UnknownGroup {
            title: title.to_string(),
        }
        .into()),
    }
}

fn reference_label(dashboard: &Dashboard, id: u64) -> String {
    dashboard.pull_request(id).map_or_else(
        || format!("#{id}"),
        |pr| format!("{}#{}", pr.reference.full_repo_name(), pr.number()),
    )
}
