// SPDX-License-Identifier: Apache-2.0

//! Output rendering for CLI commands.
//!
//! Command handlers return data; this module handles presentation in text,
//! JSON, YAML or markdown.

use std::io::{self, Write};

use anyhow::{Context, Result};
use console::{StyledObject, style};
use depdash_core::{AggregateStatus, CiStatus};
use serde::Serialize;

use crate::cli::{OutputContext, OutputFormat};

mod actions;
mod groups;

/// Trait for types that can be rendered in multiple output formats.
pub trait Renderable: Serialize {
    /// Render as human-readable text to the given writer.
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()>;

    /// Render as markdown. Defaults to text rendering.
    fn render_markdown(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()> {
        self.render_text(w, ctx)
    }
}

/// Generic render function - handles JSON/YAML via serde, delegates text/markdown to trait.
pub fn render<T: Renderable>(result: &T, ctx: &OutputContext) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(result).context("Failed to serialize to JSON")?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_saphyr::to_string(result).context("Failed to serialize to YAML")?;
            println!("{yaml}");
        }
        OutputFormat::Markdown => {
            result
                .render_markdown(&mut io::stdout(), ctx)
                .context("Failed to render markdown")?;
        }
        OutputFormat::Text => {
            result
                .render_text(&mut io::stdout(), ctx)
                .context("Failed to render text")?;
        }
    }
    Ok(())
}

/// Colored label for a PR status.
fn styled_ci(status: CiStatus) -> StyledObject<String> {
    let label = status.to_string();
    match status {
        CiStatus::Success => style(label).green(),
        CiStatus::Pending => style(label).yellow(),
        CiStatus::Failure => style(label).red(),
        CiStatus::Unknown => style(label).dim(),
    }
}

/// Colored label for a group status.
fn styled_aggregate(status: AggregateStatus) -> StyledObject<String> {
    let label = status.to_string();
    match status {
        AggregateStatus::Success => style(label).green(),
        AggregateStatus::Pending => style(label).yellow(),
        AggregateStatus::Failure => style(label).red(),
        AggregateStatus::Mixed => style(label).cyan(),
        AggregateStatus::Unknown => style(label).dim(),
    }
}

/// Escapes pipes so a value fits in a markdown table cell.
fn md_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
