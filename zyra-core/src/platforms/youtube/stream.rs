// File: zyra-core/src/platforms/youtube/stream.rs

use std::str::FromStr;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use songbird::input::HttpRequest;
use tracing::{debug, warn};

use crate::Error;
use crate::platforms::youtube::ytdlp::{AUDIO_FORMAT, StreamSource, YtDlp};
use crate::voice::{AudioStream, StreamPipeline};

/// Resolves a page URL to a direct media URL with yt-dlp, then streams it
/// over HTTP into songbird's decoder.
pub struct YtDlpPipeline {
    ytdlp: YtDlp,
    client: reqwest::Client,
}

impl YtDlpPipeline {
    pub fn new(ytdlp: YtDlp, client: reqwest::Client) -> Self {
        Self { ytdlp, client }
    }
}

fn header_map(source: &StreamSource) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (k, v) in &source.headers {
        match (HeaderName::from_str(k), HeaderValue::from_str(v)) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => warn!("(YtDlpPipeline) skipping unusable header '{k}'"),
        }
    }
    map
}

#[async_trait]
impl StreamPipeline for YtDlpPipeline {
    async fn open_stream(&self, locator: &str) -> Result<AudioStream, Error> {
        let info = self
            .ytdlp
            .dump_json(&["-f", AUDIO_FORMAT, "--no-playlist", locator])
            .await?;
        let source = info
            .stream_source()
            .ok_or_else(|| Error::UpstreamFailure(format!("no audio stream offered for {locator}")))?;
        debug!("(YtDlpPipeline) {locator} => direct stream obtained");

        let request = HttpRequest::new_with_headers(self.client.clone(), source.url.clone(), header_map(&source));
        Ok(AudioStream::new(locator, request.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn invalid_headers_are_dropped() {
        let mut headers = HashMap::new();
        headers.insert("User-Agent".to_string(), "Mozilla/5.0".to_string());
        headers.insert("Bad Header".to_string(), "x".to_string());
        let map = header_map(&StreamSource {
            url: "https://example.invalid/a.webm".into(),
            headers,
        });
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("user-agent").and_then(|v| v.to_str().ok()), Some("Mozilla/5.0"));
    }
}
