// tests/resolver_tests.rs

mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use zyra_common::models::CatalogOrigin;
use zyra_core::Error;
use zyra_core::matching::resolver::build_queries;
use zyra_core::matching::{CatalogResolver, ResolverConfig};

use test_utils::{candidate, requester, track, MockPrimary};

fn fast_config() -> ResolverConfig {
    ResolverConfig {
        inter_query_delay: Duration::ZERO,
        ..ResolverConfig::default()
    }
}

#[tokio::test]
async fn test_first_good_query_wins() {
    let mut primary = MockPrimary::new();
    primary.expect_search().times(1).returning(|_, limit| {
        assert_eq!(limit, 10);
        Ok(vec![
            candidate("Hello Kitty Unboxing", "https://youtu.be/kitty", 600, "Toys"),
            candidate("Adele - Hello (Official Audio)", "https://youtu.be/hello", 296, "AdeleVEVO"),
        ])
    });

    let resolver = CatalogResolver::new(Arc::new(primary), fast_config());
    let target = track("sp1", "Hello", "Adele", 295_000);
    let item = resolver
        .resolve_best_match(&target, &requester())
        .await
        .expect("match");

    assert_eq!(item.source_url, "https://youtu.be/hello");
    assert_eq!(item.duration_secs, 296);
    assert_eq!(item.origin, CatalogOrigin::Secondary);
    assert_eq!(item.cross_ref.as_deref(), Some("sp1"));
    assert_eq!(item.uploader, "Adele");
}

#[tokio::test]
async fn test_every_query_failing_yields_none() {
    let target = track("sp1", "Hello", "Adele", 295_000);
    let query_count = build_queries(&target).len();

    let mut primary = MockPrimary::new();
    primary
        .expect_search()
        .times(query_count)
        .returning(|_, _| Err(Error::UpstreamFailure("HTTP Error 429".into())));

    let resolver = CatalogResolver::new(Arc::new(primary), fast_config());
    assert!(resolver.resolve_best_match(&target, &requester()).await.is_none());
}

#[tokio::test]
async fn test_weak_candidates_are_rejected() {
    let mut primary = MockPrimary::new();
    primary
        .expect_search()
        .returning(|_, _| Ok(vec![candidate("Unrelated Podcast Episode", "https://youtu.be/x", 900, "Pod")]));

    let resolver = CatalogResolver::new(Arc::new(primary), fast_config());
    let target = track("sp1", "Hello", "Adele", 295_000);
    assert!(resolver.resolve_best_match(&target, &requester()).await.is_none());
}

#[tokio::test]
async fn test_later_query_can_rescue() {
    let mut primary = MockPrimary::new();
    let mut calls = 0;
    primary.expect_search().returning(move |_, _| {
        calls += 1;
        if calls < 3 {
            Ok(Vec::new())
        } else {
            // Millisecond durations are corrected before scoring.
            Ok(vec![candidate("Adele - Hello", "https://youtu.be/hello", 295_000, "Adele - Topic")])
        }
    });

    let resolver = CatalogResolver::new(Arc::new(primary), fast_config());
    let target = track("sp1", "Hello", "Adele", 295_000);
    let item = resolver
        .resolve_best_match(&target, &requester())
        .await
        .expect("match");
    assert_eq!(item.duration_secs, 295);
}

#[tokio::test]
async fn test_out_of_window_durations_are_skipped() {
    let mut primary = MockPrimary::new();
    primary.expect_search().returning(|_, _| {
        Ok(vec![
            candidate("Adele - Hello (10 hours)", "https://youtu.be/long", 36_000, "Loops"),
            candidate("Adele - Hello", "https://youtu.be/short", 5, "Clips"),
        ])
    });

    let resolver = CatalogResolver::new(Arc::new(primary), fast_config());
    let target = track("sp1", "Hello", "Adele", 295_000);
    assert!(resolver.resolve_best_match(&target, &requester()).await.is_none());
}
