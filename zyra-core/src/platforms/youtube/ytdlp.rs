// File: zyra-core/src/platforms/youtube/ytdlp.rs
//
// Thin wrapper around the yt-dlp executable. Every call asks for a single JSON
// document on stdout.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use zyra_common::models::{PlaylistPage, VideoCandidate};

use crate::Error;

pub const DEFAULT_PROGRAM: &str = "yt-dlp";

/// Audio-only webm first (opus, no transcoding), then any audio, then anything.
pub const AUDIO_FORMAT: &str = "bestaudio[ext=webm]/bestaudio/best";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Format {
    pub url: Option<String>,
    pub acodec: Option<String>,
    pub vcodec: Option<String>,
    #[serde(default)]
    pub http_headers: HashMap<String, String>,
}

impl Format {
    fn has_audio(&self) -> bool {
        self.acodec.as_deref().is_some_and(|c| c != "none")
    }

    fn is_audio_only(&self) -> bool {
        self.has_audio() && self.vcodec.as_deref().is_none_or(|c| c == "none")
    }
}

/// The subset of yt-dlp's info dict this crate reads. Flat playlist entries
/// and full extractions share it.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct InfoDict {
    pub id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub webpage_url: Option<String>,
    pub duration: Option<f64>,
    pub channel: Option<String>,
    pub uploader: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
    #[serde(default)]
    pub formats: Vec<Format>,
    #[serde(default)]
    pub http_headers: HashMap<String, String>,
    #[serde(default)]
    pub entries: Vec<InfoDict>,
}

/// A direct media URL plus the headers the host expects with it.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSource {
    pub url: String,
    pub headers: HashMap<String, String>,
}

impl InfoDict {
    fn page_url(&self) -> Option<String> {
        if let Some(u) = self.webpage_url.as_ref().filter(|u| !u.is_empty()) {
            return Some(u.clone());
        }
        if let Some(u) = self.url.as_ref().filter(|u| u.starts_with("http")) {
            return Some(u.clone());
        }
        self.id
            .as_ref()
            .filter(|id| !id.is_empty())
            .map(|id| format!("https://www.youtube.com/watch?v={id}"))
    }

    fn best_thumbnail(&self) -> Option<String> {
        self.thumbnail
            .clone()
            .or_else(|| self.thumbnails.last().map(|t| t.url.clone()))
    }

    /// None for entries without a usable URL (deleted or private videos).
    pub fn to_candidate(&self) -> Option<VideoCandidate> {
        let url = self.page_url()?;
        Some(VideoCandidate {
            title: self.title.clone().unwrap_or_else(|| "Unknown title".to_string()),
            url,
            duration_secs: self.duration.filter(|d| *d > 0.0).map(|d| d.round() as u64),
            uploader: self.channel.clone().or_else(|| self.uploader.clone()),
            thumbnail_url: self.best_thumbnail(),
        })
    }

    pub fn to_playlist(&self, fallback_url: &str) -> PlaylistPage {
        PlaylistPage {
            title: self.title.clone().unwrap_or_else(|| "Playlist".to_string()),
            url: self.webpage_url.clone().unwrap_or_else(|| fallback_url.to_string()),
            thumbnail_url: self
                .best_thumbnail()
                .or_else(|| self.entries.iter().find_map(InfoDict::best_thumbnail)),
            entries: self.entries.iter().filter_map(InfoDict::to_candidate).collect(),
        }
    }

    /// Prefers an audio-only format, then anything with audio, then the
    /// top-level URL yt-dlp picked.
    pub fn stream_source(&self) -> Option<StreamSource> {
        let pick = self
            .formats
            .iter()
            .filter(|f| f.url.is_some())
            .find(|f| f.is_audio_only())
            .or_else(|| self.formats.iter().filter(|f| f.url.is_some()).find(|f| f.has_audio()));

        match pick {
            Some(f) => Some(StreamSource {
                url: f.url.clone().unwrap_or_default(),
                headers: f.http_headers.clone(),
            }),
            None => self.url.clone().filter(|u| !u.is_empty()).map(|url| StreamSource {
                url,
                headers: self.http_headers.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
    timeout: Duration,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl YtDlp {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs yt-dlp with `--dump-single-json` and parses stdout.
    pub async fn dump_json(&self, args: &[&str]) -> Result<InfoDict, Error> {
        debug!("(YtDlp) {} {}", self.program, args.join(" "));
        let child = Command::new(&self.program)
            .arg("--dump-single-json")
            .arg("--no-warnings")
            .arg("--no-check-certificates")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| Error::Timeout(format!("yt-dlp did not answer within {}s", self.timeout.as_secs())))?
            .map_err(|e| Error::UpstreamFailure(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("(YtDlp) exited with {} => {}", output.status, stderr.trim());
            return Err(classify_failure(&stderr));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| Error::UpstreamFailure(format!("unreadable yt-dlp output: {e}")))
    }
}

fn classify_failure(stderr: &str) -> Error {
    let lower = stderr.to_lowercase();
    let line = stderr
        .lines()
        .rev()
        .find(|l| l.contains("ERROR"))
        .unwrap_or_else(|| stderr.trim())
        .trim()
        .to_string();
    if lower.contains("video unavailable")
        || lower.contains("private video")
        || lower.contains("does not exist")
        || lower.contains("not available")
        || lower.contains("http error 404")
    {
        Error::NotFound(line)
    } else {
        Error::UpstreamFailure(line)
    }
}
