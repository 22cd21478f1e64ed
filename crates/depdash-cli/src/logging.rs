// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the depdash CLI.
//!
//! Uses `tracing` with `tracing-subscriber`, writing to stderr so that
//! structured output on stdout stays parseable. The `-v` flag only affects
//! rendering; tracing verbosity comes from `RUST_LOG`.
//!
//! # Examples
//!
//! ```bash
//! # Show enrichment failures and truncated searches
//! RUST_LOG=depdash_core=info depdash list --org acme
//!
//! # Every API request
//! RUST_LOG=depdash_core=debug depdash summary --org acme
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Directives used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "depdash=warn,depdash_core=warn,reqwest=error";

/// Initialize the logging subsystem.
pub fn init_logging() {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
