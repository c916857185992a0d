// File: zyra-common/src/models/media.rs

use serde::{Deserialize, Serialize};

/// Which catalog an item was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogOrigin {
    /// Video platform; locators point straight at it.
    Primary,
    /// Music-metadata platform; items were matched onto the primary catalog.
    Secondary,
}

/// The user who asked for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub user_id: u64,
    pub display_name: String,
}

impl Requester {
    pub fn new(user_id: u64, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.user_id)
    }
}

/// A playable unit. Built once at resolution time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub title: String,
    pub source_url: String,
    /// 0 means unknown.
    pub duration_secs: u64,
    pub thumbnail_url: Option<String>,
    pub uploader: String,
    pub requested_by: Requester,
    pub origin: CatalogOrigin,
    /// Secondary-catalog track id this item was matched from.
    pub cross_ref: Option<String>,
}

/// Metadata-only track from the secondary catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: String,
    pub title: String,
    /// Primary artist first.
    pub artists: Vec<String>,
    pub duration_ms: u64,
    pub url: Option<String>,
    pub album_art: Option<String>,
}

impl TrackRecord {
    pub fn duration_secs(&self) -> u64 {
        self.duration_ms / 1000
    }

    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(String::as_str).unwrap_or("")
    }

    pub fn joined_artists(&self, sep: &str) -> String {
        self.artists.join(sep)
    }
}

/// A primary-catalog search hit or metadata lookup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoCandidate {
    pub title: String,
    pub url: String,
    /// Raw value as reported upstream; some extractors report milliseconds.
    pub duration_secs: Option<u64>,
    pub uploader: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Member list of a primary-catalog playlist.
#[derive(Debug, Clone, Default)]
pub struct PlaylistPage {
    pub title: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub entries: Vec<VideoCandidate>,
}

/// Member metadata of a secondary-catalog playlist or album.
#[derive(Debug, Clone, Default)]
pub struct TrackCollection {
    pub title: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub tracks: Vec<TrackRecord>,
}

/// An ordered set of items produced from one query.
#[derive(Debug, Clone)]
pub struct Collection {
    pub title: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub origin: CatalogOrigin,
    pub items: Vec<MediaItem>,
    /// Members still to be matched by the background fill.
    pub pending: Vec<TrackRecord>,
}

impl Collection {
    pub fn total_len(&self) -> usize {
        self.items.len() + self.pending.len()
    }
}

/// Outcome of resolving a user query.
#[derive(Debug, Clone)]
pub enum Resolved {
    Single(MediaItem),
    Collection(Collection),
}
