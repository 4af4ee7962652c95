//! Property-based tests using proptest
//!
//! These tests verify the algebra of the null-tolerant date comparison and
//! the latest-version selection built on top of it.

use azbp::blueprint::dates::{compare_date_strings, parse_timestamp};
use chrono::DateTime;
use proptest::prelude::*;
use std::cmp::Ordering;

/// A timestamp string that parses: RFC 3339 over a wide epoch range.
fn arb_valid_timestamp() -> impl Strategy<Value = String> {
    (0i64..2_000_000_000).prop_map(|secs| {
        DateTime::from_timestamp(secs, 0)
            .expect("in range")
            .to_rfc3339()
    })
}

/// Missing, valid, or junk - the three shapes the catalog actually sends.
fn arb_timestamp() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        1 => Just(None),
        3 => arb_valid_timestamp().prop_map(Some),
        1 => "[a-z ]{1,16}".prop_map(Some),
    ]
}

proptest! {
    #[test]
    fn comparison_is_antisymmetric(a in arb_timestamp(), b in arb_timestamp()) {
        let forward = compare_date_strings(a.as_deref(), b.as_deref());
        let backward = compare_date_strings(b.as_deref(), a.as_deref());
        prop_assert_eq!(forward, backward.reverse());
    }

    #[test]
    fn comparison_is_reflexive(a in arb_timestamp()) {
        prop_assert_eq!(
            compare_date_strings(a.as_deref(), a.as_deref()),
            Ordering::Equal
        );
    }

    #[test]
    fn comparison_is_transitive(
        a in arb_timestamp(),
        b in arb_timestamp(),
        c in arb_timestamp(),
    ) {
        let ab = compare_date_strings(a.as_deref(), b.as_deref());
        let bc = compare_date_strings(b.as_deref(), c.as_deref());
        if ab == Ordering::Less && bc == Ordering::Less {
            prop_assert_eq!(
                compare_date_strings(a.as_deref(), c.as_deref()),
                Ordering::Less
            );
        }
    }

    #[test]
    fn missing_is_earlier_than_any_parseable(ts in arb_valid_timestamp()) {
        prop_assert_eq!(
            compare_date_strings(None, Some(&ts)),
            Ordering::Less
        );
        prop_assert_eq!(
            compare_date_strings(Some(&ts), None),
            Ordering::Greater
        );
    }

    #[test]
    fn junk_behaves_exactly_like_missing(junk in "[a-z ]{1,16}", ts in arb_valid_timestamp()) {
        prop_assert_eq!(
            compare_date_strings(Some(&junk), Some(&ts)),
            compare_date_strings(None, Some(&ts))
        );
        prop_assert_eq!(
            compare_date_strings(Some(&junk), None),
            Ordering::Equal
        );
    }

    #[test]
    fn valid_timestamps_round_trip_through_the_parser(ts in arb_valid_timestamp()) {
        let parsed = parse_timestamp(&ts);
        prop_assert!(parsed.is_some());
        prop_assert_eq!(parsed.unwrap().to_rfc3339(), ts);
    }
}
