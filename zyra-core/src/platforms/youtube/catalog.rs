// File: zyra-core/src/platforms/youtube/catalog.rs

use async_trait::async_trait;
use tracing::info;

use zyra_common::models::{PlaylistPage, VideoCandidate};
use zyra_common::traits::PrimaryCatalog;

use crate::Error;
use crate::platforms::youtube::ytdlp::YtDlp;

/// YouTube search and metadata, backed by yt-dlp.
pub struct YouTubeCatalog {
    ytdlp: YtDlp,
}

impl YouTubeCatalog {
    pub fn new(ytdlp: YtDlp) -> Self {
        Self { ytdlp }
    }
}

#[async_trait]
impl PrimaryCatalog for YouTubeCatalog {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoCandidate>, Error> {
        let target = format!("ytsearch{}:{}", limit.max(1), query);
        let info = self.ytdlp.dump_json(&["--flat-playlist", &target]).await?;
        Ok(info
            .entries
            .iter()
            .filter_map(|e| e.to_candidate())
            .take(limit)
            .collect())
    }

    async fn video(&self, url: &str) -> Result<VideoCandidate, Error> {
        let info = self
            .ytdlp
            .dump_json(&["--no-playlist", "--skip-download", url])
            .await?;
        info.to_candidate()
            .ok_or_else(|| Error::NotFound(format!("no video behind {url}")))
    }

    async fn playlist(&self, url: &str, limit: usize) -> Result<PlaylistPage, Error> {
        let end = limit.max(1).to_string();
        let info = self
            .ytdlp
            .dump_json(&["--flat-playlist", "--yes-playlist", "--playlist-end", &end, url])
            .await?;
        let page = info.to_playlist(url);
        info!("(YouTubeCatalog) playlist '{}' => {} entries", page.title, page.entries.len());
        if page.entries.is_empty() {
            return Err(Error::NotFound(format!("playlist '{}' has no playable videos", page.title)));
        }
        Ok(page)
    }
}
