// File: zyra-core/src/platforms/genius/client.rs

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::Error;
use crate::http::HttpClient;

pub const SEARCH_URL: &str = "https://genius.com/api/search/song";

/// Largest slice of lyrics that fits one embed description.
pub const LYRICS_CHUNK_CHARS: usize = 4000;

const CONTAINER_MARKER: &str = "data-lyrics-container=\"true\"";
const NO_LYRICS: &str = "No lyrics found for this song.";

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("static regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("static regex"));

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: SearchResponse,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct Section {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    result: SongHit,
}

#[derive(Debug, Deserialize)]
struct SongHit {
    title: String,
    url: String,
    primary_artist: Option<ArtistRef>,
    song_art_image_thumbnail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsSong {
    pub title: String,
    pub artist: String,
    pub url: String,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lyrics {
    pub song: LyricsSong,
    pub text: String,
}

/// Lyrics lookup against Genius: the public search API picks the song, its
/// page carries the text.
pub struct LyricsClient {
    http: Arc<dyn HttpClient>,
}

impl LyricsClient {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    pub async fn search(&self, query: &str) -> Result<Option<LyricsSong>, Error> {
        let url = format!("{SEARCH_URL}?per_page=5&q={}", urlencoding::encode(query));
        let resp = self.http.get(&url, HashMap::new()).await?;
        if !resp.is_success() {
            return Err(Error::UpstreamFailure(format!("Genius search returned {}", resp.status)));
        }
        let envelope: SearchEnvelope = serde_json::from_str(&resp.body)?;
        let song = envelope
            .response
            .sections
            .into_iter()
            .flat_map(|s| s.hits)
            .map(|h| h.result)
            .next()
            .map(|hit| LyricsSong {
                title: hit.title,
                artist: hit.primary_artist.map(|a| a.name).unwrap_or_default(),
                url: hit.url,
                thumbnail: hit.song_art_image_thumbnail_url,
            });
        Ok(song)
    }

    pub async fn lyrics(&self, song: LyricsSong) -> Result<Lyrics, Error> {
        let resp = self.http.get(&song.url, HashMap::new()).await?;
        if !resp.is_success() {
            return Err(Error::UpstreamFailure(format!("Genius page returned {}", resp.status)));
        }
        let text = extract_lyrics(&resp.body).ok_or_else(|| {
            warn!("(LyricsClient) no lyric containers on {}", song.url);
            Error::NotFound(NO_LYRICS.into())
        })?;
        Ok(Lyrics { song, text })
    }

    /// First search hit and its lyrics.
    pub async fn find(&self, query: &str) -> Result<Lyrics, Error> {
        let song = self
            .search(query)
            .await?
            .ok_or_else(|| Error::NotFound(NO_LYRICS.into()))?;
        debug!("(LyricsClient) '{query}' => {} by {}", song.title, song.artist);
        self.lyrics(song).await
    }
}

/// End of the container body starting at `start`, and the offset just past
/// its closing `</div>`.
fn container_end(page: &str, start: usize) -> (usize, usize) {
    let mut depth = 1usize;
    let mut i = start;
    loop {
        let rest = &page[i..];
        let Some(close) = rest.find("</div>") else {
            return (page.len(), page.len());
        };
        match rest.find("<div") {
            Some(open) if open < close => {
                depth += 1;
                i += open + 4;
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return (i + close, i + close + 6);
                }
                i += close + 6;
            }
        }
    }
}

fn html_to_text(html: &str) -> String {
    let with_breaks = LINE_BREAK.replace_all(html, "\n");
    let stripped = TAG.replace_all(&with_breaks, "");
    let decoded = html_escape::decode_html_entities(&stripped);
    decoded.lines().map(str::trim).collect::<Vec<_>>().join("\n")
}

/// Plain text of every lyric container on a song page; `None` when the page
/// has none or they are empty.
pub fn extract_lyrics(page: &str) -> Option<String> {
    let mut parts = Vec::new();
    let mut from = 0;
    while let Some(pos) = page[from..].find(CONTAINER_MARKER) {
        let marker = from + pos;
        let Some(gt) = page[marker..].find('>') else { break };
        let body_start = marker + gt + 1;
        let (body_end, next) = container_end(page, body_start);
        let text = html_to_text(&page[body_start..body_end]);
        if !text.trim().is_empty() {
            parts.push(text.trim().to_string());
        }
        from = next;
    }

    let joined = parts.join("\n\n");
    let text = BLANK_RUN.replace_all(&joined, "\n\n").trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Splits on char boundaries into pieces of at most `max_chars`.
pub fn chunk_lyrics(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars.max(1))
        .map(|c| c.iter().collect())
        .collect()
}
