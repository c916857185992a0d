// File: zyra-common/src/models/mod.rs
pub mod media;
pub mod panel;
pub mod session;

pub use media::{
    CatalogOrigin, Collection, MediaItem, PlaylistPage, Requester, Resolved, TrackCollection,
    TrackRecord, VideoCandidate,
};
pub use panel::{NowPlayingPanel, PanelHandle};
pub use session::{QueueSnapshot, RepeatMode, SessionId};
