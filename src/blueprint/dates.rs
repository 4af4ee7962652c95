//! Null-tolerant timestamp comparison.
//!
//! The catalog reports creation and modification times as strings, and older
//! records sometimes omit them or carry values that do not parse. Latest-
//! version selection still needs a total order, so a missing or unparsable
//! timestamp compares as earlier than any real one, and two missing
//! timestamps compare equal.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;

/// Best-effort timestamp parse. RFC 3339 first (the format ARM actually
/// emits), then a few relaxed fallbacks; anything else is `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // Offset-less variants, treated as UTC
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    None
}

/// Compare two optional timestamp strings.
///
/// A string that fails to parse is treated exactly like a missing value:
/// missing sorts before any parsed timestamp, and two missing values are
/// equal. Otherwise ordinary chronological comparison.
pub fn compare_date_strings(first: Option<&str>, second: Option<&str>) -> Ordering {
    compare_dates(
        first.and_then(parse_timestamp),
        second.and_then(parse_timestamp),
    )
}

/// Typed overload of [`compare_date_strings`] for values that were already
/// parsed, with the same missing-is-earliest policy.
pub fn compare_dates(first: Option<DateTime<Utc>>, second: Option<DateTime<Utc>>) -> Ordering {
    match (first, second) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}
