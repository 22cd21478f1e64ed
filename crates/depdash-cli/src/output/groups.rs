// SPDX-License-Identifier: Apache-2.0

//! Rendering for `list` and `summary`.

use std::io::{self, Write};

use console::style;
use depdash_core::merge::merge_method_for;
use depdash_core::utils::{parse_and_format_relative_time, truncate};
use depdash_core::{EnrichedPullRequest, format_conclusion};

use super::{Renderable, md_cell, styled_aggregate, styled_ci};
use crate::cli::OutputContext;
use crate::commands::types::{GroupRow, ListResult, SummaryResult};

const TITLE_WIDTH: usize = 60;

impl Renderable for ListResult {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        if self.groups.is_empty() {
            writeln!(
                w,
                "{}",
                style(format!("No open bot PRs in {}.", self.organization)).dim()
            )?;
            return render_footer(self, w, ctx);
        }

        writeln!(
            w,
            "{} {}",
            style(&self.organization).bold(),
            style(format!(
                "{} open bot PRs in {} groups",
                self.pull_request_count(),
                self.groups.len()
            ))
            .dim()
        )?;
        writeln!(w)?;

        for group in &self.groups {
            render_group(group, w, ctx)?;
        }

        render_footer(self, w, ctx)
    }

    fn render_markdown(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "## Dependency updates in {}", self.organization)?;
        writeln!(w)?;
        writeln!(w, "| Group | Status | PRs | Passing | Running | Failing |")?;
        writeln!(w, "|-------|--------|-----|---------|---------|---------|")?;
        for group in &self.groups {
            writeln!(
                w,
                "| {} | {} | {} | {} | {} | {} |",
                md_cell(&group.title),
                group.status,
                group.pull_requests.len(),
                group.workflows.success,
                group.workflows.pending,
                group.workflows.failed
            )?;
        }
        if self.truncated {
            writeln!(w)?;
            writeln!(
                w,
                "_Only {} of {} matching PRs are listed._",
                self.pull_request_count(),
                self.total_count
            )?;
        }
        Ok(())
    }
}

fn render_group(group: &GroupRow, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
    let marker = if group.expanded { "v" } else { ">" };
    writeln!(
        w,
        "{} {}  {}  {}",
        style(marker).dim(),
        style(truncate(&group.title, TITLE_WIDTH)).bold(),
        styled_aggregate(group.status),
        style(format!(
            "{} PRs ({} passing, {} running, {} failing)",
            group.pull_requests.len(),
            group.workflows.success,
            group.workflows.pending,
            group.workflows.failed
        ))
        .dim()
    )?;

    if group.expanded {
        for pr in &group.pull_requests {
            render_member(pr, w, ctx)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn render_member(pr: &EnrichedPullRequest, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
    let modified = if pr.is_modified() {
        format!(" {}", style("modified").magenta())
    } else {
        String::new()
    };
    writeln!(
        w,
        "    {}#{}  {}{}  {}",
        style(pr.reference.full_repo_name()).cyan(),
        pr.number(),
        styled_ci(pr.workflow_status),
        modified,
        style(parse_and_format_relative_time(&pr.reference.created_at)).dim()
    )?;

    if let depdash_core::ActionState::Failed { message } = &pr.action {
        writeln!(w, "      {}", style(message).red())?;
    }

    if ctx.verbose {
        writeln!(w, "      {}", style(&pr.reference.html_url).dim())?;
        let method = merge_method_for(pr)
            .map_or_else(|_| "none available".to_string(), |m| m.to_string());
        writeln!(
            w,
            "      {} {}  {} {}",
            style("ci:").dim(),
            styled_ci(pr.ci_status),
            style("merge via:").dim(),
            method
        )?;
    }

    for run in &pr.check_runs {
        writeln!(
            w,
            "      - {}  {} / {}",
            run.name,
            style(run.status.label()).dim(),
            style(format_conclusion(run.conclusion)).dim()
        )?;
    }
    Ok(())
}

fn render_footer(result: &ListResult, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
    if ctx.quiet {
        return Ok(());
    }
    if result.truncated {
        writeln!(
            w,
            "{}",
            style(format!(
                "Only {} of {} matching PRs are shown.",
                result.pull_request_count(),
                result.total_count
            ))
            .yellow()
        )?;
    }
    writeln!(
        w,
        "{}",
        style(format!("Source: {}", result.source_repository_url)).dim()
    )?;
    Ok(())
}

impl Renderable for SummaryResult {
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "{}", style(format!("Workflows in {}", self.organization)).bold())?;
        writeln!(w, "  Passing: {}", style(self.summary.success).green())?;
        writeln!(w, "  Running: {}", style(self.summary.pending).yellow())?;
        writeln!(w, "  Failing: {}", style(self.summary.failed).red())?;
        writeln!(w, "  Total:   {}", self.summary.total())?;
        if self.truncated && !ctx.quiet {
            writeln!(
                w,
                "{}",
                style("Counts cover the first page of search results only.").dim()
            )?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "| Passing | Running | Failing |")?;
        writeln!(w, "|---------|---------|---------|")?;
        writeln!(
            w,
            "| {} | {} | {} |",
            self.summary.success, self.summary.pending, self.summary.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use depdash_core::{
        AggregateStatus, CheckRun, CheckRunStatus, CiStatus, PullRequestRef, WorkflowSummary,
    };

    fn ctx(verbose: bool) -> OutputContext {
        OutputContext {
            format: OutputFormat::Text,
            quiet: false,
            verbose,
            is_tty: false,
        }
    }

    fn pr(number: u64, status: CiStatus) -> EnrichedPullRequest {
        let mut pr = EnrichedPullRequest::new(
            PullRequestRef::builder()
                .id(number * 100)
                .number(number)
                .title("Update serde to v1.0.200")
                .owner("acme")
                .repo("widgets")
                .html_url(format!("https://github.com/acme/widgets/pull/{number}"))
                .build(),
        );
        pr.workflow_status = status;
        pr.ci_status = status;
        pr.commits = Some(1);
        pr.allow_rebase_merge = true;
        pr.check_runs = vec![CheckRun {
            id: number,
            name: "build".to_string(),
            status: CheckRunStatus::InProgress,
            conclusion: None,
            html_url: None,
        }];
        pr
    }

    fn result(expanded: bool, truncated: bool) -> ListResult {
        ListResult {
            organization: "acme".to_string(),
            total_count: if truncated { 150 } else { 2 },
            truncated,
            groups: vec![GroupRow {
                title: "Update serde to v1.0.200".to_string(),
                status: AggregateStatus::Failure,
                workflows: WorkflowSummary {
                    success: 1,
                    pending: 0,
                    failed: 1,
                },
                expanded,
                pull_requests: vec![pr(1, CiStatus::Success), pr(2, CiStatus::Failure)],
            }],
            source_repository_url: "https://example.test/depdash".to_string(),
        }
    }

    fn text(result: &impl Renderable, ctx: &OutputContext) -> String {
        let mut out = Vec::new();
        result.render_text(&mut out, ctx).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_collapsed_group_hides_members() {
        let out = text(&result(false, false), &ctx(false));
        assert!(out.contains("Update serde to v1.0.200"));
        assert!(out.contains("failure"));
        assert!(out.contains("2 PRs (1 passing, 0 running, 1 failing)"));
        assert!(!out.contains("acme/widgets"));
        assert!(!out.contains("In Progress"));
        assert!(out.contains("Source: https://example.test/depdash"));
    }

    #[test]
    fn test_expanded_group_lists_members() {
        let out = text(&result(true, false), &ctx(false));
        assert!(out.contains("acme/widgets"));
        assert!(out.contains("#1"));
        assert!(out.contains("#2"));
        assert!(out.contains("build  In Progress / Pending"));
        assert!(!out.contains("merge via"));
    }

    #[test]
    fn test_verbose_shows_merge_method_and_url() {
        let out = text(&result(true, false), &ctx(true));
        assert!(out.contains("merge via:"));
        assert!(out.contains("rebase"));
        assert!(out.contains("https://github.com/acme/widgets/pull/2"));
    }

    #[test]
    fn test_truncation_note() {
        let out = text(&result(false, true), &ctx(false));
        assert!(out.contains("Only 2 of 150 matching PRs are shown."));

        let out = text(&result(false, false), &ctx(false));
        assert!(!out.contains("matching PRs are shown"));
    }

    #[test]
    fn test_empty_list() {
        let empty = ListResult {
            groups: Vec::new(),
            ..result(false, false)
        };
        let out = text(&empty, &ctx(false));
        assert!(out.contains("No open bot PRs in acme."));
    }

    #[test]
    fn test_markdown_table() {
        let mut out = Vec::new();
        result(false, true)
            .render_markdown(&mut out, &ctx(false))
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("| Update serde to v1.0.200 | failure | 2 | 1 | 0 | 1 |"));
        assert!(out.contains("_Only 2 of 150 matching PRs are listed._"));
    }

    #[test]
    fn test_json_skips_source_link() {
        let json = serde_json::to_value(result(false, false)).unwrap();
        assert_eq!(json["organization"], "acme");
        assert_eq!(json["groups"][0]["status"], "failure");
        assert_eq!(json["groups"][0]["pull_requests"][1]["workflow_status"], "failure");
        assert!(json.get("source_repository_url").is_none());
    }

    #[test]
    fn test_summary_text() {
        let summary = SummaryResult {
            organization: "acme".to_string(),
            summary: WorkflowSummary {
                success: 2,
                pending: 0,
                failed: 1,
            },
            truncated: false,
        };
        let out = text(&summary, &ctx(false));
        assert!(out.contains("Workflows in acme"));
        assert!(out.contains("Total:   3"));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["success"], 2);
        assert_eq!(json["failed"], 1);
    }
}
