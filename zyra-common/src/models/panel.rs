// File: zyra-common/src/models/panel.rs

use crate::models::media::{CatalogOrigin, MediaItem};
use crate::models::session::RepeatMode;

/// Where a posted now-playing panel lives, so it can be edited or deleted later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelHandle {
    pub channel_id: u64,
    pub message_id: u64,
}

/// Everything the now-playing panel renders. Platform-agnostic.
#[derive(Debug, Clone)]
pub struct NowPlayingPanel {
    pub item: MediaItem,
    pub elapsed_secs: u64,
    pub volume: u8,
    pub repeat: RepeatMode,
    pub paused: bool,
    pub queue_len: usize,
    /// The next few upcoming items.
    pub preview: Vec<MediaItem>,
}

impl NowPlayingPanel {
    pub fn from_secondary(&self) -> bool {
        self.item.origin == CatalogOrigin::Secondary
    }
}
