//! Picking the most recently modified published version.
//!
//! The catalog does not guarantee any ordering of published versions, so the
//! selection is a left fold: a candidate replaces the running best only when
//! its modification time is strictly later. Ties keep the earliest-seen
//! candidate, which makes the result deterministic for a stable input order.

use crate::blueprint::dates::compare_dates;
use crate::blueprint::models::PublishedBlueprint;
use std::cmp::Ordering;

/// Select the latest-modified version, or `None` for an empty input.
pub fn select_latest(versions: Vec<PublishedBlueprint>) -> Option<PublishedBlueprint> {
    let mut latest: Option<PublishedBlueprint> = None;

    for candidate in versions {
        match &latest {
            None => latest = Some(candidate),
            Some(best) => {
                if compare_dates(candidate.status.last_modified, best.status.last_modified)
                    == Ordering::Greater
                {
                    latest = Some(candidate);
                }
            }
        }
    }

    latest
}
