// File: zyra-core/src/platforms/spotify/client.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use zyra_common::models::{TrackCollection, TrackRecord};
use zyra_common::traits::SecondaryCatalog;

use crate::Error;
use crate::http::HttpClient;
use crate::platforms::spotify::auth::{SpotifyAuthenticator, SpotifyCredentials};

pub const API_BASE: &str = "https://api.spotify.com/v1";

const PAGE_SIZE: usize = 50;
const PAGE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Deserialize)]
struct Image {
    url: String,
}

#[derive(Debug, Deserialize, Default)]
struct ExternalUrls {
    spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

#[derive(Debug, Deserialize, Default)]
struct AlbumRef {
    #[serde(default)]
    images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    external_urls: ExternalUrls,
    album: Option<AlbumRef>,
    #[serde(default)]
    is_local: bool,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<ApiTrack>,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContainerInfo {
    name: String,
    #[serde(default)]
    images: Vec<Image>,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Page<ApiTrack>,
}

impl ApiTrack {
    /// Local files, podcast episodes and tracks without identity are dropped.
    fn into_record(self, fallback_art: Option<&str>) -> Option<TrackRecord> {
        if self.is_local || self.kind.as_deref().is_some_and(|k| k != "track") {
            return None;
        }
        let id = self.id.filter(|id| !id.is_empty())?;
        if self.name.trim().is_empty() {
            return None;
        }
        let artists: Vec<String> = self
            .artists
            .into_iter()
            .map(|a| a.name)
            .filter(|n| !n.trim().is_empty())
            .collect();
        if artists.is_empty() {
            return None;
        }
        let album_art = self
            .album
            .and_then(|a| a.images.into_iter().next())
            .map(|i| i.url)
            .or_else(|| fallback_art.map(str::to_string));
        Some(TrackRecord {
            url: self
                .external_urls
                .spotify
                .or_else(|| Some(format!("https://open.spotify.com/track/{id}"))),
            id,
            title: self.name,
            artists,
            duration_ms: self.duration_ms,
            album_art,
        })
    }
}

/// Spotify Web API client. Metadata only; audio always comes from the primary catalog.
pub struct SpotifyClient {
    http: Arc<dyn HttpClient>,
    auth: SpotifyAuthenticator,
    api_base: String,
    page_delay: Duration,
}

impl SpotifyClient {
    pub fn new(http: Arc<dyn HttpClient>, credentials: SpotifyCredentials) -> Self {
        Self {
            auth: SpotifyAuthenticator::new(http.clone(), credentials),
            http,
            api_base: API_BASE.to_string(),
            page_delay: PAGE_DELAY,
        }
    }

    /// Overrides the pause between paginated requests.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// GET with bearer auth. A 401 invalidates the cached token and retries once.
    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str, what: &str) -> Result<T, Error> {
        let url = format!("{}{}", self.api_base, path_and_query);
        let mut retried = false;
        loop {
            let token = self.auth.bearer_token().await?;
            let mut headers = HashMap::new();
            headers.insert("Authorization".to_string(), format!("Bearer {token}"));

            let resp = self.http.get(&url, headers).await?;
            match resp.status {
                s if (200..300).contains(&s) => return Ok(serde_json::from_str(&resp.body)?),
                401 if !retried => {
                    debug!("(SpotifyClient) 401 on {path_and_query} => refreshing token");
                    self.auth.invalidate().await;
                    retried = true;
                }
                404 => return Err(Error::NotFound(format!("Spotify {what} not found or is private"))),
                429 => {
                    return Err(Error::UpstreamFailure(
                        "Spotify API rate limit reached, try again later".into(),
                    ));
                }
                other => {
                    warn!("(SpotifyClient) GET {path_and_query} => HTTP {other}");
                    return Err(Error::UpstreamFailure(format!(
                        "Spotify API returned HTTP {other} for {what}"
                    )));
                }
            }
        }
    }

    async fn container_info(&self, kind: &str, id: &str) -> Result<ContainerInfo, Error> {
        self.get_json(&format!("/{kind}s/{id}"), kind).await
    }
}

#[async_trait]
impl SecondaryCatalog for SpotifyClient {
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<TrackRecord>, Error> {
        let q = urlencoding::encode(query);
        let resp: SearchResponse = self
            .get_json(&format!("/search?q={q}&type=track&limit={}", limit.clamp(1, 50)), "search")
            .await?;
        Ok(resp
            .tracks
            .items
            .into_iter()
            .filter_map(|t| t.into_record(None))
            .take(limit)
            .collect())
    }

    async fn get_track(&self, id: &str) -> Result<TrackRecord, Error> {
        let track: ApiTrack = self.get_json(&format!("/tracks/{id}"), "track").await?;
        track
            .into_record(None)
            .ok_or_else(|| Error::NotFound(format!("Spotify track {id} is not playable")))
    }

    async fn get_playlist(&self, id: &str, cap: usize) -> Result<TrackCollection, Error> {
        let info = self.container_info("playlist", id).await?;
        let mut tracks: Vec<TrackRecord> = Vec::new();
        let mut offset = 0usize;

        while tracks.len() < cap {
            if offset > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
            let page: Page<PlaylistItem> = self
                .get_json(
                    &format!("/playlists/{id}/tracks?limit={PAGE_SIZE}&offset={offset}"),
                    "playlist",
                )
                .await?;
            let fetched = page.items.len();
            tracks.extend(
                page.items
                    .into_iter()
                    .filter_map(|item| item.track)
                    .filter_map(|t| t.into_record(None)),
            );
            offset += fetched;
            if page.next.is_none() || fetched == 0 {
                break;
            }
        }
        tracks.truncate(cap);

        info!("(SpotifyClient) playlist '{}' => {} usable tracks", info.name, tracks.len());
        if tracks.is_empty() {
            return Err(Error::NotFound(format!(
                "Spotify playlist '{}' has no playable tracks",
                info.name
            )));
        }
        Ok(TrackCollection {
            title: info.name,
            url: info.external_urls.spotify,
            image_url: info.images.into_iter().next().map(|i| i.url),
            tracks,
        })
    }

    async fn get_album(&self, id: &str) -> Result<TrackCollection, Error> {
        let info = self.container_info("album", id).await?;
        let cover = info.images.into_iter().next().map(|i| i.url);
        let mut tracks: Vec<TrackRecord> = Vec::new();
        let mut offset = 0usize;

        loop {
            if offset > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
            let page: Page<ApiTrack> = self
                .get_json(
                    &format!("/albums/{id}/tracks?limit={PAGE_SIZE}&offset={offset}"),
                    "album",
                )
                .await?;
            let fetched = page.items.len();
            // Album track objects carry no album block, so the cover comes from the album itself.
            tracks.extend(page.items.into_iter().filter_map(|t| t.into_record(cover.as_deref())));
            offset += fetched;
            if page.next.is_none() || fetched == 0 {
                break;
            }
        }

        if tracks.is_empty() {
            return Err(Error::NotFound(format!("Spotify album '{}' has no playable tracks", info.name)));
        }
        Ok(TrackCollection {
            title: info.name,
            url: info.external_urls.spotify,
            image_url: cover,
            tracks,
        })
    }

    async fn check_auth(&self) -> Result<(), Error> {
        self.auth.invalidate().await;
        self.auth.bearer_token().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use crate::http::HttpResponse;

    /// Answers by URL prefix and records every request.
    #[derive(Default)]
    struct CannedHttp {
        routes: Vec<(String, u16, String)>,
        seen: Mutex<Vec<String>>,
    }

    impl CannedHttp {
        fn route(mut self, prefix: &str, status: u16, body: &str) -> Self {
            self.routes.push((prefix.to_string(), status, body.to_string()));
            self
        }
    }

    #[async_trait]
    impl HttpClient for CannedHttp {
        async fn get(&self, url: &str, _headers: HashMap<String, String>) -> Result<HttpResponse, Error> {
            self.seen.lock().unwrap().push(url.to_string());
            let (_, status, body) = self
                .routes
                .iter()
                .find(|(p, _, _)| url.starts_with(p.as_str()))
                .cloned()
                .unwrap_or_else(|| (String::new(), 404, "{}".into()));
            Ok(HttpResponse { status, body })
        }

        async fn post_form(
            &self,
            url: &str,
            _headers: HashMap<String, String>,
            _form: &[(&str, &str)],
        ) -> Result<HttpResponse, Error> {
            self.seen.lock().unwrap().push(url.to_string());
            Ok(HttpResponse {
                status: 200,
                body: r#"{"access_token":"tok","token_type":"Bearer","expires_in":3600}"#.into(),
            })
        }
    }

    fn creds() -> SpotifyCredentials {
        SpotifyCredentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
        }
    }

    fn client(http: CannedHttp) -> (Arc<CannedHttp>, SpotifyClient) {
        let http = Arc::new(http);
        let c = SpotifyClient::new(http.clone(), creds()).with_page_delay(Duration::ZERO);
        (http, c)
    }

    const TRACK: &str = r#"{"id":"t1","name":"Blinding Lights","type":"track","is_local":false,
        "artists":[{"name":"The Weeknd"}],"duration_ms":200040,
        "external_urls":{"spotify":"https://open.spotify.com/track/t1"},
        "album":{"images":[{"url":"https://img/1"}]}}"#;

    #[tokio::test]
    async fn get_track_maps_fields() -> Result<(), Error> {
        let (_, c) = client(CannedHttp::default().route(&format!("{API_BASE}/tracks/t1"), 200, TRACK));
        let t = c.get_track("t1").await?;
        assert_eq!(t.title, "Blinding Lights");
        assert_eq!(t.artists, vec!["The Weeknd".to_string()]);
        assert_eq!(t.duration_secs(), 200);
        assert_eq!(t.album_art.as_deref(), Some("https://img/1"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_track_is_not_found() {
        let (_, c) = client(CannedHttp::default());
        let err = c.get_track("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn playlist_filters_unusable_entries_and_paginates() -> Result<(), Error> {
        let page1 = format!(
            r#"{{"items":[{{"track":{TRACK}}},{{"track":null}},
                {{"track":{{"id":"l1","name":"Local","type":"track","is_local":true,"artists":[{{"name":"x"}}]}}}},
                {{"track":{{"id":"e1","name":"Episode","type":"episode","artists":[{{"name":"x"}}]}}}}],
                "next":"more"}}"#
        );
        let page2 = r#"{"items":[{"track":{"id":"t2","name":"Save Your Tears","type":"track",
            "artists":[{"name":"The Weeknd"}],"duration_ms":215000}},
            {"track":{"id":"t3","name":"No Artists","type":"track","artists":[]}}],"next":null}"#;
        let http = CannedHttp::default()
            .route(&format!("{API_BASE}/playlists/p1/tracks?limit=50&offset=0"), 200, &page1)
            .route(&format!("{API_BASE}/playlists/p1/tracks?limit=50&offset=4"), 200, page2)
            .route(
                &format!("{API_BASE}/playlists/p1"),
                200,
                r#"{"name":"Mix","images":[{"url":"https://img/p"}],"external_urls":{"spotify":"https://open.spotify.com/playlist/p1"}}"#,
            );
        let (_, c) = client(http);
        let coll = c.get_playlist("p1", 500).await?;
        assert_eq!(coll.title, "Mix");
        assert_eq!(coll.image_url.as_deref(), Some("https://img/p"));
        let ids: Vec<_> = coll.tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        Ok(())
    }

    #[tokio::test]
    async fn playlist_respects_cap() -> Result<(), Error> {
        let items: Vec<String> = (0..50)
            .map(|i| {
                format!(r#"{{"track":{{"id":"t{i}","name":"Song {i}","type":"track","artists":[{{"name":"A"}}]}}}}"#)
            })
            .collect();
        let page = format!(r#"{{"items":[{}],"next":"more"}}"#, items.join(","));
        let http = CannedHttp::default()
            .route(&format!("{API_BASE}/playlists/p1/tracks"), 200, &page)
            .route(&format!("{API_BASE}/playlists/p1"), 200, r#"{"name":"Big"}"#);
        let (http, c) = client(http);
        let coll = c.get_playlist("p1", 60).await?;
        assert_eq!(coll.tracks.len(), 60);
        let pages = http.seen.lock().unwrap().iter().filter(|u| u.contains("/tracks?")).count();
        assert_eq!(pages, 2);
        Ok(())
    }

    #[tokio::test]
    async fn album_tracks_inherit_cover() -> Result<(), Error> {
        let http = CannedHttp::default()
            .route(
                &format!("{API_BASE}/albums/a1/tracks"),
                200,
                r#"{"items":[{"id":"t1","name":"One","type":"track","artists":[{"name":"A"}],"duration_ms":1000}],"next":null}"#,
            )
            .route(&format!("{API_BASE}/albums/a1"), 200, r#"{"name":"Album","images":[{"url":"https://img/a"}]}"#);
        let (_, c) = client(http);
        let coll = c.get_album("a1").await?;
        assert_eq!(coll.tracks[0].album_art.as_deref(), Some("https://img/a"));
        Ok(())
    }

    #[tokio::test]
    async fn token_is_cached_between_calls() -> Result<(), Error> {
        let (http, c) = client(CannedHttp::default().route(&format!("{API_BASE}/tracks/t1"), 200, TRACK));
        c.get_track("t1").await?;
        c.get_track("t1").await?;
        let token_calls = http
            .seen
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == crate::platforms::spotify::auth::TOKEN_URL)
            .count();
        assert_eq!(token_calls, 1);
        Ok(())
    }
}
