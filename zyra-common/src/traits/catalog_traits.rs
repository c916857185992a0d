use async_trait::async_trait;

use crate::error::Error;
use crate::models::{PlaylistPage, TrackCollection, TrackRecord, VideoCandidate};

/// The video platform. Every locator handed to the streaming pipeline comes from here.
#[async_trait]
pub trait PrimaryCatalog: Send + Sync {
    /// Free-text search, at most `limit` hits, best first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoCandidate>, Error>;

    /// Metadata for a single video URL.
    async fn video(&self, url: &str) -> Result<VideoCandidate, Error>;

    /// Members of a playlist URL, capped at `limit`.
    async fn playlist(&self, url: &str, limit: usize) -> Result<PlaylistPage, Error>;
}

/// The music-metadata platform. Only supplies metadata, never audio.
#[async_trait]
pub trait SecondaryCatalog: Send + Sync {
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<TrackRecord>, Error>;

    async fn get_track(&self, id: &str) -> Result<TrackRecord, Error>;

    /// Playlist members, paginated upstream and capped at `cap`.
    async fn get_playlist(&self, id: &str, cap: usize) -> Result<TrackCollection, Error>;

    async fn get_album(&self, id: &str) -> Result<TrackCollection, Error>;

    /// Forces a credential round-trip; used by the status command.
    async fn check_auth(&self) -> Result<(), Error>;
}
