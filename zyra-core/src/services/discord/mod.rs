// File: zyra-core/src/services/discord/mod.rs

pub mod slashcommands;

use std::sync::Arc;

use twilight_cache_inmemory::InMemoryCache;
use twilight_http::Client as HttpClient;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, UserMarker};

use zyra_common::models::SessionId;
use zyra_common::traits::StatusNotifier;

use crate::platforms::discord::notifier::ChannelNotifier;
use crate::platforms::genius::LyricsClient;
use crate::services::music::MusicService;

/// Shared state every interaction handler needs.
pub struct DiscordContext {
    pub http: Arc<HttpClient>,
    pub cache: Arc<InMemoryCache>,
    pub music: Arc<MusicService>,
    pub lyrics: Arc<LyricsClient>,
}

impl DiscordContext {
    pub fn new(
        http: Arc<HttpClient>,
        cache: Arc<InMemoryCache>,
        music: Arc<MusicService>,
        lyrics: Arc<LyricsClient>,
    ) -> Self {
        Self {
            http,
            cache,
            music,
            lyrics,
        }
    }

    /// Voice channel `user` is connected to in `guild`, per the gateway cache.
    pub fn voice_channel_of(&self, guild: SessionId, user: Id<UserMarker>) -> Option<u64> {
        let guild: Id<GuildMarker> = Id::new_checked(guild.0)?;
        self.cache
            .voice_state(user, guild)
            .map(|state| state.channel_id().get())
    }

    pub fn bot_voice_channel(&self, guild: SessionId) -> Option<u64> {
        let me = self.cache.current_user()?;
        self.voice_channel_of(guild, me.id)
    }

    pub fn notifier_for(&self, channel: Id<ChannelMarker>) -> Arc<dyn StatusNotifier> {
        Arc::new(ChannelNotifier::new(self.http.clone(), channel))
    }
}
