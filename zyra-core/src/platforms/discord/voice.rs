// File: zyra-core/src/platforms/discord/voice.rs
//
// songbird-backed voice transport. The twilight shards feed voice gateway
// events into `Songbird::process`; see runtime.rs.

use std::num::NonZeroU64;
use std::sync::Arc;

use async_trait::async_trait;
use songbird::error::JoinError;
use songbird::events::{CoreEvent, Event, EventContext, EventHandler, TrackEvent};
use songbird::id::{ChannelId, GuildId};
use songbird::tracks::{Track, TrackHandle};
use songbird::{Call, Songbird};
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use uuid::Uuid;

use zyra_common::models::SessionId;

use crate::Error;
use crate::voice::{AudioStream, TransportEvent, VoiceGateway, VoiceTransport};

fn guild_id(session: SessionId) -> Result<GuildId, Error> {
    NonZeroU64::new(session.0)
        .map(GuildId::from)
        .ok_or_else(|| Error::Platform(format!("invalid guild id {session}")))
}

/// Forwards songbird events into the session's transport channel.
struct EventForwarder {
    tx: UnboundedSender<TransportEvent>,
    kind: ForwardKind,
}

enum ForwardKind {
    TrackEnd(Uuid),
    TrackError(Uuid),
    Disconnect,
    Reconnect,
}

#[async_trait]
impl EventHandler for EventForwarder {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        let event = match &self.kind {
            ForwardKind::TrackEnd(id) => TransportEvent::TrackEnded { track_id: *id },
            ForwardKind::TrackError(id) => {
                let reason = match ctx {
                    EventContext::Track(states) => states
                        .first()
                        .map(|(state, _)| format!("{:?}", state.playing))
                        .unwrap_or_else(|| "playback failed".to_string()),
                    _ => "playback failed".to_string(),
                };
                TransportEvent::TrackErrored { track_id: *id, reason }
            }
            ForwardKind::Disconnect => TransportEvent::Disconnected,
            ForwardKind::Reconnect => TransportEvent::Reconnected,
        };
        if self.tx.send(event).is_err() {
            debug!("(SongbirdTransport) event receiver gone");
        }
        None
    }
}

pub struct SongbirdGateway {
    songbird: Arc<Songbird>,
}

impl SongbirdGateway {
    pub fn new(songbird: Arc<Songbird>) -> Self {
        Self { songbird }
    }
}

#[async_trait]
impl VoiceGateway for SongbirdGateway {
    async fn join(
        &self,
        session: SessionId,
        channel_id: u64,
        events: UnboundedSender<TransportEvent>,
    ) -> Result<Arc<dyn VoiceTransport>, Error> {
        let guild = guild_id(session)?;
        let channel = NonZeroU64::new(channel_id)
            .map(ChannelId::from)
            .ok_or_else(|| Error::Platform(format!("invalid channel id {channel_id}")))?;

        let call = self
            .songbird
            .join(guild, channel)
            .await
            .map_err(|e| Error::Platform(format!("Could not join the voice channel: {e}")))?;

        {
            let mut handler = call.lock().await;
            handler.remove_all_global_events();
            handler.add_global_event(
                Event::Core(CoreEvent::DriverDisconnect),
                EventForwarder {
                    tx: events.clone(),
                    kind: ForwardKind::Disconnect,
                },
            );
            handler.add_global_event(
                Event::Core(CoreEvent::DriverReconnect),
                EventForwarder {
                    tx: events.clone(),
                    kind: ForwardKind::Reconnect,
                },
            );
            if let Err(e) = handler.deafen(true).await {
                debug!("(SongbirdGateway) could not self-deafen => {e}");
            }
        }
        info!("(SongbirdGateway) joined channel {channel_id} in guild {session}");

        Ok(Arc::new(SongbirdTransport {
            songbird: self.songbird.clone(),
            guild,
            call,
            events,
            current: Mutex::new(None),
        }))
    }
}

pub struct SongbirdTransport {
    songbird: Arc<Songbird>,
    guild: GuildId,
    call: Arc<Mutex<Call>>,
    events: UnboundedSender<TransportEvent>,
    current: Mutex<Option<TrackHandle>>,
}

impl SongbirdTransport {
    async fn with_track<F>(&self, what: &str, f: F) -> Result<(), Error>
    where
        F: FnOnce(&TrackHandle) -> Result<(), songbird::tracks::ControlError>,
    {
        let guard = self.current.lock().await;
        let Some(track) = guard.as_ref() else {
            return Err(Error::InvalidState("Nothing is playing right now.".into()));
        };
        f(track).map_err(|e| Error::Platform(format!("could not {what}: {e}")))
    }
}

#[async_trait]
impl VoiceTransport for SongbirdTransport {
    async fn attach(&self, stream: AudioStream, volume: f32) -> Result<Uuid, Error> {
        let track = Track::from(stream.input).volume(volume);
        let handle = {
            let mut call = self.call.lock().await;
            call.play_only(track)
        };
        let id = handle.uuid();

        for (event, kind) in [
            (TrackEvent::End, ForwardKind::TrackEnd(id)),
            (TrackEvent::Error, ForwardKind::TrackError(id)),
        ] {
            let forwarder = EventForwarder {
                tx: self.events.clone(),
                kind,
            };
            if let Err(e) = handle.add_event(Event::Track(event), forwarder) {
                warn!("(SongbirdTransport) failed to watch track {id} => {e}");
            }
        }

        debug!("(SongbirdTransport) attached {} as {id}", stream.locator);
        *self.current.lock().await = Some(handle);
        Ok(id)
    }

    async fn pause(&self) -> Result<(), Error> {
        self.with_track("pause", |t| t.pause()).await
    }

    async fn resume(&self) -> Result<(), Error> {
        self.with_track("resume", |t| t.play()).await
    }

    async fn stop_track(&self) -> Result<(), Error> {
        self.with_track("stop", |t| t.stop()).await
    }

    async fn set_volume(&self, volume: f32) -> Result<(), Error> {
        self.with_track("set volume", |t| t.set_volume(volume)).await
    }

    async fn release(&self) -> Result<(), Error> {
        self.current.lock().await.take();
        match self.songbird.remove(self.guild).await {
            Ok(()) => Ok(()),
            Err(JoinError::NoCall) => Err(Error::NotFound("voice connection already released".into())),
            Err(e) => Err(Error::Platform(format!("failed to leave voice: {e}"))),
        }
    }
}
