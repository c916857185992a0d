// tests/locator_tests.rs

mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use zyra_common::models::{CatalogOrigin, PlaylistPage, Resolved, TrackCollection};
use zyra_common::traits::{PrimaryCatalog, SecondaryCatalog};
use zyra_core::Error;
use zyra_core::matching::{CatalogResolver, ResolverConfig};
use zyra_core::services::music::{LocatorConfig, MediaLocator};

use test_utils::{candidate, requester, track, MockPrimary, MockSecondary};

fn locator(primary: MockPrimary, secondary: Option<MockSecondary>, config: LocatorConfig) -> MediaLocator {
    let primary: Arc<dyn PrimaryCatalog> = Arc::new(primary);
    let resolver = Arc::new(CatalogResolver::new(
        primary.clone(),
        ResolverConfig {
            inter_query_delay: Duration::ZERO,
            ..ResolverConfig::default()
        },
    ));
    let secondary = secondary.map(|s| Arc::new(s) as Arc<dyn SecondaryCatalog>);
    MediaLocator::new(primary, secondary, resolver, config)
}

/// A primary catalog whose search always turns up the official upload of `title`.
fn matching_primary() -> MockPrimary {
    let mut primary = MockPrimary::new();
    primary.expect_search().returning(|query, _| {
        let title = query.split(' ').next().unwrap_or("").to_string();
        Ok(vec![candidate(
            &format!("Artist - {title} (Official Audio)"),
            &format!("https://youtu.be/{title}"),
            200,
            "ArtistVEVO",
        )])
    });
    primary
}

#[tokio::test]
async fn test_free_text_prefers_the_secondary_catalog() -> Result<(), Error> {
    let mut secondary = MockSecondary::new();
    secondary
        .expect_search_tracks()
        .times(1)
        .returning(|_, _| Ok(vec![track("sp1", "Wonder", "Artist", 200_000)]));

    let locator = locator(matching_primary(), Some(secondary), LocatorConfig::default());
    let Resolved::Single(item) = locator.resolve("wonder artist", &requester()).await? else {
        panic!("expected a single item");
    };
    assert_eq!(item.origin, CatalogOrigin::Secondary);
    assert_eq!(item.source_url, "https://youtu.be/Wonder");
    assert_eq!(item.cross_ref.as_deref(), Some("sp1"));
    Ok(())
}

#[tokio::test]
async fn test_free_text_falls_back_to_primary_search() -> Result<(), Error> {
    let mut secondary = MockSecondary::new();
    secondary
        .expect_search_tracks()
        .returning(|_, _| Err(Error::UpstreamFailure("rate limited".into())));

    let mut primary = MockPrimary::new();
    primary
        .expect_search()
        .times(1)
        .returning(|_, _| Ok(vec![candidate("Some Video", "https://youtu.be/vid", 0, "")]));
    primary.expect_video().times(1).returning(|url| {
        assert_eq!(url, "https://youtu.be/vid");
        Ok(candidate("Some Video", "https://youtu.be/vid", 245, "Channel"))
    });

    let locator = locator(primary, Some(secondary), LocatorConfig::default());
    let Resolved::Single(item) = locator.resolve("some video", &requester()).await? else {
        panic!("expected a single item");
    };
    assert_eq!(item.origin, CatalogOrigin::Primary);
    assert_eq!(item.duration_secs, 245);
    assert_eq!(item.uploader, "Channel");
    Ok(())
}

#[tokio::test]
async fn test_free_text_with_no_hits_is_not_found() {
    let mut primary = MockPrimary::new();
    primary.expect_search().returning(|_, _| Ok(Vec::new()));

    let locator = locator(primary, None, LocatorConfig::default());
    let err = locator.resolve("zzqqxx", &requester()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_blank_query_and_mix_links_are_unsupported() {
    let locator = locator(MockPrimary::new(), None, LocatorConfig::default());
    assert!(matches!(
        locator.resolve("   ", &requester()).await,
        Err(Error::UnsupportedInput(_))
    ));
    assert!(matches!(
        locator
            .resolve("https://www.youtube.com/watch?v=abc&list=RDabc", &requester())
            .await,
        Err(Error::UnsupportedInput(_))
    ));
}

#[tokio::test]
async fn test_spotify_links_need_a_secondary_catalog() {
    let locator = locator(MockPrimary::new(), None, LocatorConfig::default());
    let err = locator
        .resolve("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC", &requester())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedInput(_)));
}

#[tokio::test]
async fn test_youtube_playlist_becomes_a_collection() -> Result<(), Error> {
    let mut primary = MockPrimary::new();
    primary.expect_playlist().times(1).returning(|url, limit| {
        assert_eq!(limit, 2);
        Ok(PlaylistPage {
            title: "Mixtape".into(),
            url: url.to_string(),
            thumbnail_url: None,
            entries: vec![
                candidate("One", "https://youtu.be/1", 100, "A"),
                candidate("Two", "https://youtu.be/2", 200_000, "B"),
                candidate("Three", "https://youtu.be/3", 300, "C"),
            ],
        })
    });

    let config = LocatorConfig {
        playlist_limit: 2,
        ..LocatorConfig::default()
    };
    let locator = locator(primary, None, config);
    let Resolved::Collection(coll) = locator
        .resolve("https://www.youtube.com/playlist?list=PLabc", &requester())
        .await?
    else {
        panic!("expected a collection");
    };
    assert_eq!(coll.title, "Mixtape");
    assert_eq!(coll.items.len(), 2);
    // 200000 reads as milliseconds.
    assert_eq!(coll.items[1].duration_secs, 200);
    assert!(coll.pending.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_empty_youtube_playlist_is_not_found() {
    let mut primary = MockPrimary::new();
    primary.expect_playlist().returning(|url, _| {
        Ok(PlaylistPage {
            title: "Nothing".into(),
            url: url.to_string(),
            ..PlaylistPage::default()
        })
    });
    let locator = locator(primary, None, LocatorConfig::default());
    let err = locator
        .resolve("https://www.youtube.com/playlist?list=PLempty", &requester())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_spotify_playlist_resolves_leading_members_only() -> Result<(), Error> {
    let mut secondary = MockSecondary::new();
    secondary.expect_get_playlist().times(1).returning(|id, cap| {
        assert_eq!(id, "37i9dQZF1DXcBWIGoYBM5M");
        assert_eq!(cap, 500);
        Ok(TrackCollection {
            title: "Top Hits".into(),
            url: Some("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M".into()),
            image_url: Some("https://i.scdn.co/image/cover".into()),
            tracks: ["Alpha", "Bravo", "Charlie", "Delta", "Echo"]
                .iter()
                .enumerate()
                .map(|(i, t)| track(&format!("sp{i}"), t, "Artist", 200_000))
                .collect(),
        })
    });

    let config = LocatorConfig {
        eager_members: 2,
        ..LocatorConfig::default()
    };
    let locator = locator(matching_primary(), Some(secondary), config);
    let Resolved::Collection(coll) = locator
        .resolve("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M", &requester())
        .await?
    else {
        panic!("expected a collection");
    };
    assert_eq!(coll.origin, CatalogOrigin::Secondary);
    let titles: Vec<&str> = coll.items.iter().map(|i| i.source_url.as_str()).collect();
    assert_eq!(titles, vec!["https://youtu.be/Alpha", "https://youtu.be/Bravo"]);
    let pending: Vec<&str> = coll.pending.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(pending, vec!["Charlie", "Delta", "Echo"]);
    assert_eq!(coll.total_len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_unmatched_spotify_track_is_not_found() {
    let mut secondary = MockSecondary::new();
    secondary
        .expect_get_track()
        .returning(|id| Ok(track(id, "Obscure B-Side", "Nobody", 200_000)));
    let mut primary = MockPrimary::new();
    primary.expect_search().returning(|_, _| Ok(Vec::new()));

    let locator = locator(primary, Some(secondary), LocatorConfig::default());
    let err = locator
        .resolve("spotify:track:4uLU6hMCjMI75M1A2tKUQC", &requester())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
