// SPDX-License-Identifier: Apache-2.0

//! Per-member outcomes of a group action.
//!
//! Group actions run member by member; each member ends up succeeded,
//! skipped (filtered out before any request) or failed. The dashboard's
//! error slot only keeps the last failure, so the full picture lives here.

use serde::Serialize;

/// Outcome of processing a single item in a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum BulkOutcome<T> {
    /// Item was processed successfully with a result.
    Success(T),
    /// Item was skipped (e.g., failing workflow).
    Skipped(String),
    /// Item processing failed with an error.
    Failed(String),
}

/// Result of a bulk processing operation.
#[derive(Debug, Clone, Serialize)]
pub struct BulkResult<I, T> {
    /// Number of items processed successfully.
    pub succeeded: usize,
    /// Number of items that failed processing.
    pub failed: usize,
    /// Number of items that were skipped.
    pub skipped: usize,
    /// Detailed outcomes for each item (identifier, outcome), in processing order.
    pub outcomes: Vec<(I, BulkOutcome<T>)>,
}

impl<I, T> Default for BulkResult<I, T> {
    fn default() -> Self {
        Self {
            succeeded: 0,
            failed: 0,
            skipped: 0,
            outcomes: Vec::new(),
        }
    }
}

impl<I, T> BulkResult<I, T> {
    /// Records a success.
    pub fn record_success(&mut self, id: I, value: T) {
        self.succeeded += 1;
        self.outcomes.push((id, BulkOutcome::Success(value)));
    }

    /// Records an item that was never attempted.
    pub fn record_skipped(&mut self, id: I, reason: impl Into<String>) {
        self.skipped += 1;
        self.outcomes.push((id, BulkOutcome::Skipped(reason.into())));
    }

    /// Records a failure.
    pub fn record_failure(&mut self, id: I, message: impl Into<String>) {
        self.failed += 1;
        self.outcomes.push((id, BulkOutcome::Failed(message.into())));
    }

    /// Number of items attempted or skipped.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }

    /// True when at least one item failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_keep_order_and_counts() {
        let mut result: BulkResult<u64, String> = BulkResult::default();
        result.record_success(1, "merged".to_string());
        result.record_skipped(2, "Failing workflow");
        result.record_failure(3, "Validation Failed");

        assert_eq!(result.succeeded, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.total(), 3);
        assert!(result.has_failures());

        let ids: Vec<u64> = result.outcomes.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(
            result.outcomes[2].1,
            BulkOutcome::Failed("Validation Failed".to_string())
        );
    }

    #[test]
    fn test_empty_result() {
        let result: BulkResult<u64, ()> = BulkResult::default();
        assert_eq!(result.total(), 0);
        assert!(!result.has_failures());
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome: BulkOutcome<()> = BulkOutcome::Skipped("Failing workflow".to_string());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "skipped");
        assert_eq!(json["detail"], "Failing workflow");
    }
}
