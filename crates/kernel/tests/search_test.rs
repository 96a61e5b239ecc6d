#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Search and tiering tests.

use tradesfinder_kernel::models::{PlanTier, ProviderRecord};
use tradesfinder_kernel::search::{SearchFilters, paginate, search};
use tradesfinder_kernel::tiering::{mark_boosted, slot_limit};
use tradesfinder_test_utils::test_provider;

fn names(records: &[ProviderRecord]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

fn sample() -> Vec<ProviderRecord> {
    vec![
        test_provider("Ace Plumbing")
            .with_trade("plumber")
            .with_area("riverside")
            .with_rating(4.8, 31)
            .available()
            .created_at(100)
            .build(),
        test_provider("Bright Sparks")
            .with_trade("electrician")
            .with_area("riverside")
            .with_plan(PlanTier::Pro)
            .with_rating(4.2, 12)
            .created_at(200)
            .build(),
        test_provider("Castle Roofing")
            .with_trade("roofer")
            .with_area("hilltop")
            .with_plan(PlanTier::Premium)
            .featured()
            .with_rating(3.9, 7)
            .available()
            .created_at(300)
            .build(),
        test_provider("Drip Doctors")
            .with_description("Emergency plumber, boilers and leaks")
            .with_trade("plumber")
            .with_area("hilltop")
            .with_rating(4.8, 31)
            .created_at(50)
            .build(),
    ]
}

#[test]
fn test_featured_premium_outranks_top_rated_free() {
    let records = vec![
        test_provider("B").with_rating(5.0, 1).build(),
        test_provider("A")
            .with_plan(PlanTier::Premium)
            .featured()
            .with_rating(4.0, 1)
            .build(),
    ];

    let ranked = search(&records, &SearchFilters::default());
    assert_eq!(names(&ranked), ["A", "B"]);
}

#[test]
fn test_featured_wins_regardless_of_rating() {
    let records = vec![
        test_provider("plain").with_rating(5.0, 500).build(),
        test_provider("featured").featured().with_rating(1.0, 1).build(),
    ];
    let ranked = search(&records, &SearchFilters::default());
    assert_eq!(ranked[0].name, "featured");
}

#[test]
fn test_equal_free_records_older_first() {
    let ranked = search(&sample(), &SearchFilters {
        trade: Some("plumber".to_string()),
        ..Default::default()
    });
    // Same tier, rating and review count: Drip Doctors was listed first.
    assert_eq!(names(&ranked), ["Drip Doctors", "Ace Plumbing"]);
}

#[test]
fn test_full_ranking() {
    let ranked = search(&sample(), &SearchFilters::default());
    assert_eq!(
        names(&ranked),
        ["Castle Roofing", "Bright Sparks", "Drip Doctors", "Ace Plumbing"]
    );
}

#[test]
fn test_filter_soundness() {
    let records = sample();
    let filter_sets = [
        SearchFilters {
            trade: Some("plumber".to_string()),
            ..Default::default()
        },
        SearchFilters {
            area: Some("riverside".to_string()),
            available_now: Some(true),
            ..Default::default()
        },
        SearchFilters {
            query: Some("BOILER".to_string()),
            ..Default::default()
        },
        SearchFilters {
            trade: Some("roofer".to_string()),
            area: Some("riverside".to_string()),
            ..Default::default()
        },
    ];

    for filters in &filter_sets {
        let ranked = search(&records, filters);
        for record in &ranked {
            assert!(filters.matches(record), "{} should not match {filters:?}", record.name);
        }
        let expected = records.iter().filter(|r| filters.matches(r)).count();
        assert_eq!(ranked.len(), expected);
    }
}

#[test]
fn test_search_is_deterministic() {
    let mut records = sample();
    let first = search(&records, &SearchFilters::default());
    let second = search(&records, &SearchFilters::default());
    assert_eq!(first, second);

    // Input order does not matter either.
    records.reverse();
    assert_eq!(search(&records, &SearchFilters::default()), first);
}

#[test]
fn test_text_query_matches_description() {
    let ranked = search(&sample(), &SearchFilters {
        query: Some("leaks".to_string()),
        ..Default::default()
    });
    assert_eq!(names(&ranked), ["Drip Doctors"]);
}

#[test]
fn test_pages_are_stable() {
    let ranked = search(&sample(), &SearchFilters::default());
    let page_one = paginate(ranked.clone(), 0, 2);
    let page_two = paginate(ranked, 2, 2);
    assert_eq!(names(&page_one.results), ["Castle Roofing", "Bright Sparks"]);
    assert_eq!(names(&page_two.results), ["Drip Doctors", "Ace Plumbing"]);
    assert_eq!(page_two.total_pages(), 2);
}

#[test]
fn test_slot_limits() {
    assert_eq!(slot_limit(PlanTier::Free), 0);
    assert!(slot_limit(PlanTier::Premium) >= slot_limit(PlanTier::Pro));
    assert!(slot_limit(PlanTier::Pro) >= slot_limit(PlanTier::Free));
}

#[test]
fn test_boosting_caps_per_tier() {
    let mut records: Vec<ProviderRecord> = (0..10)
        .map(|i| {
            test_provider(&format!("premium-{i}"))
                .with_plan(PlanTier::Premium)
                .featured()
                .created_at(i)
                .build()
        })
        .collect();
    records.push(test_provider("free-featured").featured().build());

    let ranked = search(&records, &SearchFilters::default());
    let boosted = mark_boosted(&ranked);

    let boosted_names: Vec<&str> = ranked
        .iter()
        .zip(&boosted)
        .filter(|(_, b)| **b)
        .map(|(r, _)| r.name.as_str())
        .collect();
    assert_eq!(boosted_names.len(), slot_limit(PlanTier::Premium));
    assert_eq!(boosted_names[0], "premium-0");
    assert!(!boosted_names.contains(&"free-featured"));
}
