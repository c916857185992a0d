//! Seams between the session queue and the audio stack.
//!
//! [`StreamPipeline`] turns a primary-catalog locator into decodable audio.
//! [`VoiceGateway`] connects to a voice channel and hands back a
//! [`VoiceTransport`], which plays one stream at a time and reports back
//! through a [`TransportEvent`] channel. Production implementations live in
//! `platforms::discord::voice` and `platforms::youtube::stream`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use songbird::input::Input;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use zyra_common::models::SessionId;

use crate::Error;

/// An opened, not yet playing, audio stream.
pub struct AudioStream {
    pub locator: String,
    pub input: Input,
}

impl AudioStream {
    pub fn new(locator: impl Into<String>, input: Input) -> Self {
        Self {
            locator: locator.into(),
            input,
        }
    }
}

impl fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioStream").field("locator", &self.locator).finish()
    }
}

#[async_trait]
pub trait StreamPipeline: Send + Sync {
    async fn open_stream(&self, locator: &str) -> Result<AudioStream, Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The attached track played to the end or was stopped.
    TrackEnded { track_id: Uuid },
    TrackErrored { track_id: Uuid, reason: String },
    /// The voice connection dropped; it may come back.
    Disconnected,
    Reconnected,
}

/// A live voice connection for one session.
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    /// Replaces whatever is playing with `stream` and returns the new track id.
    /// `volume` is linear, 1.0 = unchanged.
    async fn attach(&self, stream: AudioStream, volume: f32) -> Result<Uuid, Error>;

    async fn pause(&self) -> Result<(), Error>;

    async fn resume(&self) -> Result<(), Error>;

    /// Ends the current track; a `TrackEnded` event follows.
    async fn stop_track(&self) -> Result<(), Error>;

    async fn set_volume(&self, volume: f32) -> Result<(), Error>;

    /// Leaves the channel. Returns `Error::NotFound` when already released.
    async fn release(&self) -> Result<(), Error>;
}

#[async_trait]
pub trait VoiceGateway: Send + Sync {
    async fn join(
        &self,
        session: SessionId,
        channel_id: u64,
        events: UnboundedSender<TransportEvent>,
    ) -> Result<Arc<dyn VoiceTransport>, Error>;
}
