// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition for depdash.
//!
//! Uses clap's derive API. Every command works against one organization,
//! taken from `--org` or from `user.default_org` in the config file.

use std::io::IsTerminal;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Extended help text for the generate subcommand with shell-specific examples.
const COMPLETION_GENERATE_HELP: &str = r#"EXAMPLES

  bash
    Add to ~/.bashrc or ~/.bash_profile:
      eval "$(depdash completion generate bash)"

  zsh
    Generate completion file:
      mkdir -p ~/.zsh/completions
      depdash completion generate zsh > ~/.zsh/completions/_depdash

    Add to ~/.zshrc (before compinit):
      fpath=(~/.zsh/completions $fpath)
      autoload -U compinit && compinit -i

  fish
    Generate completion file:
      depdash completion generate fish > ~/.config/fish/completions/depdash.fish

  PowerShell
    Add to $PROFILE:
      depdash completion generate powershell | Out-String | Invoke-Expression
"#;

/// Output format for CLI results.
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors (default)
    #[default]
    Text,
    /// JSON output for programmatic consumption
    Json,
    /// YAML output for programmatic consumption
    Yaml,
    /// Markdown tables, e.g. for pasting into an issue
    Markdown,
}

/// Output context passed to commands for format-aware rendering.
#[derive(Clone, Copy)]
pub struct OutputContext {
    /// Output format (text, json, yaml, markdown)
    pub format: OutputFormat,
    /// Suppress non-essential output (spinners, notes)
    pub quiet: bool,
    /// Show per-PR details in text output
    pub verbose: bool,
    /// Whether stdout is a terminal (TTY)
    pub is_tty: bool,
}

impl OutputContext {
    /// Creates an `OutputContext` from CLI arguments.
    pub fn from_cli(format: OutputFormat, quiet: bool, verbose: bool) -> Self {
        Self {
            format,
            quiet,
            verbose,
            is_tty: std::io::stdout().is_terminal(),
        }
    }

    /// Returns true if interactive elements (spinners, prompts) should be shown.
    pub fn is_interactive(&self) -> bool {
        self.is_tty && !self.quiet && matches!(self.format, OutputFormat::Text)
    }

    /// Returns true for plain text output.
    pub fn is_text(&self) -> bool {
        matches!(self.format, OutputFormat::Text)
    }
}

/// depdash - review and bulk-merge dependency update PRs.
#[derive(Parser)]
#[command(name = "depdash", version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t)]
    pub output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Show check runs and merge settings of each PR
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Organization to search (overrides `user.default_org`)
    #[arg(long, global = true, value_name = "ORG")]
    pub org: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List open bot PRs grouped by title
    List {
        /// Expand every group to show its members
        #[arg(long, short = 'e')]
        expand: bool,

        /// Only show groups with this title
        #[arg(long, value_name = "TITLE")]
        group: Option<String>,
    },

    /// Count open bot PRs by workflow status
    Summary,

    /// Close a single PR (`owner/repo#N` or a pull request URL)
    Close {
        /// PR reference
        reference: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Approve and merge a single PR (`owner/repo#N` or a pull request URL)
    Merge {
        /// PR reference
        reference: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Close every PR in a group
    CloseGroup {
        /// Group title (the shared PR title)
        title: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Approve and merge every PR in a group whose workflows are not failing
    MergeGroup {
        /// Group title (the shared PR title)
        title: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Shell completion scripts
    #[command(subcommand)]
    Completion(CompletionCommand),
}

/// Completion subcommands
#[derive(Subcommand)]
pub enum CompletionCommand {
    /// Generate completion script for a shell (output to stdout)
    #[command(after_long_help = COMPLETION_GENERATE_HELP)]
    Generate {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
