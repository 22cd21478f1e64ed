// SPDX-License-Identifier: Apache-2.0

//! Text helpers shared by every front end: truncation and date display.

use chrono::{DateTime, Utc};

/// Truncates text to a maximum length with a trailing "...".
///
/// Uses character count (not byte count) to safely handle multi-byte UTF-8.
/// The ellipsis is included in the max length calculation.
///
/// # Examples
///
/// ```
/// use depdash_core::utils::truncate;
///
/// assert_eq!(truncate("Update A", 20), "Update A");
///
/// let long = "Update dependency typescript to v5.6.3 in all workspaces";
/// let result = truncate(long, 20);
/// assert!(result.ends_with("..."));
/// assert_eq!(result.chars().count(), 20);
/// ```
#[must_use]
pub fn truncate(text: &str, max_len: usize) -> String {
    const SUFFIX: &str = "...";

    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(SUFFIX.len());
    let truncated: String = text.chars().take(keep).collect();
    format!("{truncated}{SUFFIX}")
}

/// Formats a `DateTime<Utc>` as relative time (e.g., "3 days ago").
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use depdash_core::utils::format_relative_time;
///
/// let now = Utc::now();
/// assert_eq!(format_relative_time(&now), "just now");
/// assert_eq!(format_relative_time(&(now - Duration::days(1))), "1 day ago");
/// ```
#[must_use]
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(*dt);

    let (value, unit) = if duration.num_days() > 30 {
        (duration.num_days() / 30, "month")
    } else if duration.num_days() > 0 {
        (duration.num_days(), "day")
    } else if duration.num_hours() > 0 {
        (duration.num_hours(), "hour")
    } else {
        return "just now".to_string();
    };

    if value == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{value} {unit}s ago")
    }
}

/// Parses an ISO 8601 timestamp and formats it as relative time.
///
/// Returns the original string if parsing fails, including the empty
/// timestamp of a PR that was never discovered through search.
#[must_use]
pub fn parse_and_format_relative_time(timestamp: &str) -> String {
    match timestamp.parse::<DateTime<Utc>>() {
        Ok(dt) => format_relative_time(&dt),
        Err(_) => timestamp.to_string(),
    }
}

/// Formats an ISO 8601 timestamp as a calendar date (`2024-05-01`).
///
/// Returns the original string if parsing fails.
#[must_use]
pub fn format_date(timestamp: &str) -> String {
    match timestamp.parse::<DateTime<Utc>>() {
        Ok(dt) => dt.format("%Y-%m-%d").to_string(),
        Err(_) => timestamp.to_string(),
    }
}
