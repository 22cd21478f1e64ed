// SPDX-License-Identifier: Apache-2.0

//! Discovery, grouping and enrichment of bot PRs for one organization.

use tracing::{info, instrument, warn};

use crate::enrich::enrich_all;
use crate::github::api::{GitHubApi, SearchItem};
use crate::store::PrStore;

/// Result of one search cycle.
#[derive(Debug)]
pub struct SearchOutcome {
    /// Grouped and enriched PRs.
    pub store: PrStore,
    /// Matches reported by the server.
    pub total_count: u64,
    /// Items on the fetched page, before unparseable ones were dropped.
    pub returned: usize,
}

impl SearchOutcome {
    /// True when the server has more matches than one page holds.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.total_count > self.returned as u64
    }
}

/// Runs the discovery query, groups the hits by title and enriches every
/// PR concurrently. Aggregates are computed after all enrichments settle.
///
/// # Errors
///
/// Fails only when the discovery query itself fails; per-PR enrichment
/// failures degrade that PR to unknown status.
#[instrument(skip(api))]
pub async fn discover(api: &GitHubApi, org: &str) -> crate::Result<SearchOutcome> {
    let response = api.search_bot_pull_requests(org).await?;
    let returned = response.items.len();

    let mut store = PrStore::from_refs(
        response
            .items
            .into_iter()
            .filter_map(SearchItem::into_pull_request_ref),
    );

    enrich_all(api, store.pull_requests_mut()).await;
    store.recompute_all();

    let outcome = SearchOutcome {
        store,
        total_count: response.total_count,
        returned,
    };

    if outcome.is_truncated() {
        warn!(
            total_count = outcome.total_count,
            per_page = api.per_page(),
            "More open PRs than fit on one page; results are truncated"
        );
    }
    info!(
        groups = outcome.store.groups().len(),
        prs = outcome.store.len(),
        "Search finished"
    );

    Ok(outcome)
}
