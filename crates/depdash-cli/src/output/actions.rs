// SPDX-License-Identifier: Apache-2.0

//! Rendering for close and merge results.

use std::io::{self, Write};

use console::style;
use depdash_core::{BulkOutcome, MergeMethod};

use super::{Renderable, md_cell};
use crate::cli::OutputContext;
use crate::commands::types::{ActionResult, Cancelled, GroupActionResult};

impl Renderable for ActionResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        let via = self
            .merge_method
            .map(|m| format!(" via {m}"))
            .unwrap_or_default();
        writeln!(
            w,
            "{} {} {}{}",
            style(self.action.label()).green().bold(),
            style(&self.reference).cyan(),
            style(format!("\"{}\"", self.title)).dim(),
            via
        )
    }
}

/// Text for a successful member outcome.
pub trait SuccessDetail {
    /// Short description of the success value, if any.
    fn detail(&self) -> Option<String>;
}

impl SuccessDetail for () {
    fn detail(&self) -> Option<String> {
        None
    }
}

impl SuccessDetail for MergeMethod {
    fn detail(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl<T> Renderable for GroupActionResult<T>
where
    T: SuccessDetail + serde::Serialize,
{
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        writeln!(w)?;
        writeln!(w, "{}", style(&self.title).bold())?;

        for (label, outcome) in &self.result.outcomes {
            match outcome {
                BulkOutcome::Success(value) => {
                    let detail = value.detail().map(|d| format!(" ({d})")).unwrap_or_default();
                    writeln!(
                        w,
                        "  {} {}{}",
                        style(self.action.label()).green(),
                        label,
                        style(detail).dim()
                    )?;
                }
                BulkOutcome::Skipped(reason) => {
                    writeln!(
                        w,
                        "  {} {} {}",
                        style("Skipped").yellow(),
                        label,
                        style(reason).dim()
                    )?;
                }
                BulkOutcome::Failed(reason) => {
                    writeln!(w, "  {} {} {}", style("Failed").red(), label, reason)?;
                }
            }
        }

        writeln!(w)?;
        writeln!(w, "  Succeeded: {}", style(self.result.succeeded).green())?;
        writeln!(w, "  Failed:    {}", style(self.result.failed).red())?;
        writeln!(w, "  Skipped:   {}", style(self.result.skipped).yellow())?;
        writeln!(w, "  Total:     {}", self.result.total())?;

        if !ctx.quiet && !self.group_removed && self.result.has_failures() {
            writeln!(
                w,
                "{}",
                style("Failed PRs stay in the group; run the command again to retry.").dim()
            )?;
        }
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "### {}", self.title)?;
        writeln!(w)?;
        writeln!(w, "| PR | Outcome | Detail |")?;
        writeln!(w, "|----|---------|--------|")?;
        for (label, outcome) in &self.result.outcomes {
            let (kind, detail) = match outcome {
                BulkOutcome::Success(value) => ("success", value.detail().unwrap_or_default()),
                BulkOutcome::Skipped(reason) => ("skipped", reason.clone()),
                BulkOutcome::Failed(reason) => ("failed", reason.clone()),
            };
            writeln!(w, "| {label} | {kind} | {} |", md_cell(&detail))?;
        }
        Ok(())
    }
}

impl Renderable for Cancelled {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "{}", style("Cancelled. Nothing was changed.").yellow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::commands::types::ActionKind;
    use depdash_core::BulkResult;

    fn ctx() -> OutputContext {
        OutputContext {
            format: OutputFormat::Text,
            quiet: false,
            verbose: false,
            is_tty: false,
        }
    }

    fn merge_result() -> GroupActionResult<MergeMethod> {
        let mut result = BulkResult::default();
        result.record_success("acme/widgets#1".to_string(), MergeMethod::Rebase);
        result.record_skipped(
            "acme/gadgets#2".to_string(),
            "Cannot merge PR with failing workflow checks".to_string(),
        );
        result.record_failure("acme/tools#3".to_string(), "Base branch was modified".to_string());
        GroupActionResult {
            title: "Update serde to v1.0.200".to_string(),
            action: ActionKind::Merged,
            result,
            group_removed: false,
        }
    }

    #[test]
    fn test_group_merge_text_lists_every_outcome() {
        let mut out = Vec::new();
        merge_result().render_text(&mut out, &ctx()).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("acme/widgets#1"));
        assert!(out.contains("(rebase)"));
        assert!(out.contains("acme/gadgets#2"));
        assert!(out.contains("Base branch was modified"));
        assert!(out.contains("Total:     3"));
        assert!(out.contains("run the command again to retry"));
    }

    #[test]
    fn test_group_merge_json_shape() {
        let json = serde_json::to_value(merge_result()).unwrap();
        assert_eq!(json["title"], "Update serde to v1.0.200");
        assert_eq!(json["action"], "merged");
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["skipped"], 1);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["outcomes"][0][0], "acme/widgets#1");
        assert_eq!(json["outcomes"][0][1]["outcome"], "success");
        assert_eq!(json["outcomes"][0][1]["detail"], "rebase");
    }

    #[test]
    fn test_close_group_markdown() {
        let mut result = BulkResult::default();
        result.record_success("acme/widgets#1".to_string(), ());
        let closed = GroupActionResult {
            title: "Update A".to_string(),
            action: ActionKind::Closed,
            result,
            group_removed: true,
        };
        let mut out = Vec::new();
        closed.render_markdown(&mut out, &ctx()).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("| acme/widgets#1 | success |  |"));
    }

    #[test]
    fn test_single_merge_text() {
        let result = ActionResult {
            reference: "acme/widgets#7".to_string(),
            title: "Update A".to_string(),
            action: ActionKind::Merged,
            merge_method: Some(MergeMethod::Squash),
        };
        let mut out = Vec::new();
        result.render_text(&mut out, &ctx()).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Merged"));
        assert!(out.contains("acme/widgets#7"));
        assert!(out.contains("via squash"));
    }
}
