// File: zyra-core/src/services/music/locator.rs

use std::sync::Arc;

use tracing::{debug, info, warn};

use zyra_common::models::{
    CatalogOrigin, Collection, MediaItem, Requester, Resolved, TrackCollection, VideoCandidate,
};
use zyra_common::traits::{PrimaryCatalog, SecondaryCatalog};

use crate::Error;
use crate::matching::CatalogResolver;
use crate::platforms::spotify::{is_spotify_url, parse_link, SpotifyLink};
use crate::platforms::youtube::urls::{is_mix, is_youtube_url, playlist_id};

/// Durations above a day can only be milliseconds.
const MILLIS_FLOOR: u64 = 86_400;

#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Maximum members taken from any playlist.
    pub playlist_limit: usize,
    /// Secondary-catalog members resolved before the reply; the rest are
    /// left for the background fill.
    pub eager_members: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            playlist_limit: 500,
            eager_members: 3,
        }
    }
}

/// Turns a user query (URL or free text) into playable items.
pub struct MediaLocator {
    primary: Arc<dyn PrimaryCatalog>,
    secondary: Option<Arc<dyn SecondaryCatalog>>,
    resolver: Arc<CatalogResolver>,
    config: LocatorConfig,
}

impl MediaLocator {
    pub fn new(
        primary: Arc<dyn PrimaryCatalog>,
        secondary: Option<Arc<dyn SecondaryCatalog>>,
        resolver: Arc<CatalogResolver>,
        config: LocatorConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            resolver,
            config,
        }
    }

    pub fn primary(&self) -> &Arc<dyn PrimaryCatalog> {
        &self.primary
    }

    pub fn secondary(&self) -> Option<&Arc<dyn SecondaryCatalog>> {
        self.secondary.as_ref()
    }

    pub fn resolver(&self) -> &Arc<CatalogResolver> {
        &self.resolver
    }

    pub async fn resolve(&self, query: &str, requester: &Requester) -> Result<Resolved, Error> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::UnsupportedInput("Please provide a song name or URL.".into()));
        }

        if is_spotify_url(query) {
            return self.resolve_spotify(query, requester).await;
        }

        if is_youtube_url(query) {
            return match playlist_id(query) {
                Some(list) if is_mix(list) => Err(Error::UnsupportedInput(
                    "YouTube Mix playlists are generated per user and cannot be loaded. \
                     Use a regular playlist or the video link instead."
                        .into(),
                )),
                Some(_) => self.resolve_youtube_playlist(query, requester).await,
                None => {
                    let video = self.primary.video(query).await?;
                    Ok(Resolved::Single(from_candidate(video, requester)))
                }
            };
        }

        self.resolve_free_text(query, requester).await.map(Resolved::Single)
    }

    async fn resolve_spotify(&self, query: &str, requester: &Requester) -> Result<Resolved, Error> {
        let Some(secondary) = self.secondary.as_ref() else {
            return Err(Error::UnsupportedInput(
                "Spotify links are not available: Spotify is not configured.".into(),
            ));
        };
        let link = parse_link(query).ok_or_else(|| {
            Error::UnsupportedInput("Only Spotify track, playlist and album links are supported.".into())
        })?;

        match link {
            SpotifyLink::Track(id) => {
                let track = secondary.get_track(&id).await?;
                let item = self
                    .resolver
                    .resolve_best_match(&track, requester)
                    .await
                    .ok_or_else(|| {
                        Error::NotFound(format!(
                            "Could not find \"{}\" by {} on YouTube.",
                            track.title,
                            track.joined_artists(", ")
                        ))
                    })?;
                Ok(Resolved::Single(item))
            }
            SpotifyLink::Playlist(id) => {
                let coll = secondary.get_playlist(&id, self.config.playlist_limit).await?;
                self.resolve_track_collection(coll, requester).await
            }
            SpotifyLink::Album(id) => {
                let coll = secondary.get_album(&id).await?;
                self.resolve_track_collection(coll, requester).await
            }
        }
    }

    /// Resolves the leading members now and hands the rest to the caller as
    /// `pending`.
    async fn resolve_track_collection(&self, coll: TrackCollection, requester: &Requester) -> Result<Resolved, Error> {
        let TrackCollection {
            title,
            url,
            image_url,
            mut tracks,
        } = coll;
        tracks.truncate(self.config.playlist_limit);
        let split = self.config.eager_members.min(tracks.len());
        let pending = tracks.split_off(split);

        let mut items = Vec::with_capacity(tracks.len());
        for track in &tracks {
            match self.resolver.resolve_best_match(track, requester).await {
                Some(item) => items.push(item),
                None => debug!("(MediaLocator) skipping unmatched '{}'", track.title),
            }
        }

        if items.is_empty() && pending.is_empty() {
            return Err(Error::NotFound(format!(
                "None of the songs in \"{title}\" could be found on YouTube."
            )));
        }
        info!(
            "(MediaLocator) collection '{}' => {} resolved now, {} pending",
            title,
            items.len(),
            pending.len()
        );
        Ok(Resolved::Collection(Collection {
            title,
            url: url.unwrap_or_default(),
            thumbnail_url: image_url,
            origin: CatalogOrigin::Secondary,
            items,
            pending,
        }))
    }

    async fn resolve_youtube_playlist(&self, url: &str, requester: &Requester) -> Result<Resolved, Error> {
        let page = self.primary.playlist(url, self.config.playlist_limit).await?;
        let items: Vec<MediaItem> = page
            .entries
            .into_iter()
            .take(self.config.playlist_limit)
            .map(|c| from_candidate(c, requester))
            .collect();
        if items.is_empty() {
            return Err(Error::NotFound(format!("Playlist \"{}\" is empty.", page.title)));
        }
        Ok(Resolved::Collection(Collection {
            title: page.title,
            url: page.url,
            thumbnail_url: page.thumbnail_url,
            origin: CatalogOrigin::Primary,
            items,
            pending: Vec::new(),
        }))
    }

    /// Spotify first (better metadata), YouTube search as the fallback.
    async fn resolve_free_text(&self, query: &str, requester: &Requester) -> Result<MediaItem, Error> {
        if let Some(secondary) = self.secondary.as_ref() {
            match secondary.search_tracks(query, 1).await {
                Ok(hits) => {
                    if let Some(track) = hits.first() {
                        if let Some(item) = self.resolver.resolve_best_match(track, requester).await {
                            return Ok(item);
                        }
                        debug!("(MediaLocator) Spotify hit '{}' had no YouTube match", track.title);
                    }
                }
                Err(e) => warn!("(MediaLocator) Spotify search failed => {e}, falling back to YouTube"),
            }
        }

        let hits = self.primary.search(query, 1).await?;
        let first = hits
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("No results found for \"{query}\".")))?;
        let video = match self.primary.video(&first.url).await {
            Ok(v) => v,
            Err(e) => {
                // The search hit already carries enough to play.
                warn!("(MediaLocator) metadata lookup for {} failed => {e}", first.url);
                first
            }
        };
        Ok(from_candidate(video, requester))
    }
}

pub fn corrected_duration(raw: Option<u64>) -> u64 {
    match raw.unwrap_or(0) {
        d if d > MILLIS_FLOOR => d / 1000,
        d => d,
    }
}

/// Primary-catalog metadata as a queue item.
pub fn from_candidate(candidate: VideoCandidate, requester: &Requester) -> MediaItem {
    MediaItem {
        duration_secs: corrected_duration(candidate.duration_secs),
        title: candidate.title,
        source_url: candidate.url,
        thumbnail_url: candidate.thumbnail_url,
        uploader: candidate
            .uploader
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        requested_by: requester.clone(),
        origin: CatalogOrigin::Primary,
        cross_ref: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_normalisation() {
        let req = Requester::new(7, "dj");
        let item = from_candidate(
            VideoCandidate {
                title: "Song".into(),
                url: "https://youtu.be/x".into(),
                duration_secs: Some(213_000_000),
                uploader: Some("  ".into()),
                thumbnail_url: None,
            },
            &req,
        );
        assert_eq!(item.duration_secs, 213_000);
        assert_eq!(item.uploader, "Unknown");
        assert_eq!(item.origin, CatalogOrigin::Primary);
        assert_eq!(corrected_duration(Some(10_800)), 10_800);
        assert_eq!(corrected_duration(None), 0);
    }
}
