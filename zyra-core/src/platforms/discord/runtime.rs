// File: zyra-core/src/platforms/discord/runtime.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use songbird::Songbird;
use songbird::shards::TwilightMap;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use twilight_cache_inmemory::{InMemoryCache, ResourceType};
use twilight_gateway::{
    self as gateway, CloseFrame, Config, Event, EventTypeFlags, Intents, MessageSender, Shard, StreamExt,
};
use twilight_http::Client as HttpClient;
use twilight_http::client::ClientBuilder;
use twilight_model::gateway::payload::incoming::Ready as ReadyPayload;

use zyra_common::models::SessionId;

use crate::Error;
use crate::services::discord::DiscordContext;
use crate::services::discord::slashcommands::{handle_interaction_create, register_global_slash_commands};

/// Gateway intents the music bot needs: guild metadata and voice states.
pub fn intents() -> Intents {
    Intents::GUILDS | Intents::GUILD_VOICE_STATES
}

/// The shard runner:
///   - calls `shard.next_event(...)`
///   - updates the in-memory cache and feeds songbird
///   - registers commands once shard 0 is ready
///   - hands interactions to the slash-command dispatcher.
async fn shard_runner(mut shard: Shard, ctx: Arc<DiscordContext>, songbird: Arc<Songbird>) {
    let shard_id = shard.id().number();
    info!("(ShardRunner) Shard {shard_id} started. Listening for events.");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(event) => event,
            Err(err) => {
                error!("Shard {shard_id} => error receiving event: {err:?}");
                continue;
            }
        };
        ctx.cache.update(&event);
        songbird.process(&event).await;

        match event {
            Event::Ready(ready) => {
                let data: &ReadyPayload = ready.as_ref();
                info!(
                    "Shard {shard_id} => READY as {} (ID={}) in {} guilds",
                    data.user.name,
                    data.user.id,
                    data.guilds.len()
                );
                if shard_id == 0 {
                    let http = ctx.http.clone();
                    let application_id = data.application.id;
                    tokio::spawn(async move {
                        if let Err(e) = register_global_slash_commands(&http, application_id).await {
                            error!("(ShardRunner) {e}");
                        }
                    });
                }
            }
            Event::InteractionCreate(interaction) => {
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_interaction_create(ctx, interaction).await {
                        warn!("(ShardRunner) interaction failed => {e}");
                    }
                });
            }
            Event::VoiceStateUpdate(update) => {
                // Bot was moved out of voice by someone else.
                let me = ctx.cache.current_user().map(|u| u.id);
                if Some(update.user_id) == me && update.channel_id.is_none() {
                    if let Some(guild) = update.guild_id {
                        let ctx = ctx.clone();
                        tokio::spawn(async move {
                            match ctx.music.disconnect(SessionId(guild.get())).await {
                                Ok(()) => info!("(ShardRunner) left voice in guild {guild}, session stopped"),
                                Err(e) => debug!("(ShardRunner) voice leave in guild {guild} => {e}"),
                            }
                        });
                    }
                }
            }
            other => {
                trace!("Shard {shard_id} => unhandled event: {:?}", other.kind());
            }
        }
    }

    warn!("(ShardRunner) Shard {shard_id} event loop ended.");
}

/// Gateway connection. Built in two steps because songbird needs the shard
/// senders before the shards start and the music service needs songbird.
pub struct DiscordPlatform {
    token: String,
    http: Arc<HttpClient>,
    cache: Arc<InMemoryCache>,
    pending_shards: Vec<Shard>,
    shard_senders: Vec<MessageSender>,
    shard_tasks: Vec<JoinHandle<()>>,
    songbird: Option<Arc<Songbird>>,
}

impl DiscordPlatform {
    pub fn new(token: String) -> Self {
        let http = Arc::new(
            ClientBuilder::new()
                .token(token.clone())
                .timeout(Duration::from_secs(30))
                .build(),
        );
        let cache = Arc::new(
            InMemoryCache::builder()
                .resource_types(
                    ResourceType::GUILD
                        | ResourceType::CHANNEL
                        | ResourceType::VOICE_STATE
                        | ResourceType::USER_CURRENT,
                )
                .build(),
        );
        Self {
            token,
            http,
            cache,
            pending_shards: Vec::new(),
            shard_senders: Vec::new(),
            shard_tasks: Vec::new(),
            songbird: None,
        }
    }

    pub fn http(&self) -> Arc<HttpClient> {
        self.http.clone()
    }

    pub fn cache(&self) -> Arc<InMemoryCache> {
        self.cache.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.shard_tasks.is_empty()
    }

    /// Creates the recommended shards and the songbird manager bound to them.
    pub async fn prepare(&mut self) -> Result<Arc<Songbird>, Error> {
        if self.token.is_empty() {
            return Err(Error::Auth("Discord token is empty".into()));
        }
        if let Some(songbird) = &self.songbird {
            info!("(DiscordPlatform) Already prepared => skipping");
            return Ok(songbird.clone());
        }

        let user_id = self
            .http
            .current_user()
            .await
            .map_err(|e| Error::Auth(format!("Discord rejected the token: {e}")))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error reading current user: {e}")))?
            .id;

        let config = Config::new(self.token.clone(), intents());
        let shards: Vec<Shard> = gateway::create_recommended(&self.http, config, |_, b| b.build())
            .await
            .map_err(|e| Error::Platform(format!("create_recommended error: {e}")))?
            .collect();

        let senders: HashMap<u32, MessageSender> = shards
            .iter()
            .map(|shard| (shard.id().number(), shard.sender()))
            .collect();
        self.shard_senders = senders.values().cloned().collect();

        let songbird = Arc::new(Songbird::twilight(Arc::new(TwilightMap::new(senders)), user_id));
        info!("(DiscordPlatform) prepared {} shard(s) for user {user_id}", shards.len());
        self.pending_shards = shards;
        self.songbird = Some(songbird.clone());
        Ok(songbird)
    }

    /// Starts a runner per prepared shard.
    pub fn spawn(&mut self, ctx: Arc<DiscordContext>) -> Result<(), Error> {
        let songbird = self
            .songbird
            .clone()
            .ok_or_else(|| Error::InvalidState("DiscordPlatform::prepare must run first".into()))?;
        for shard in self.pending_shards.drain(..) {
            let ctx = ctx.clone();
            let songbird = songbird.clone();
            self.shard_tasks
                .push(tokio::spawn(async move { shard_runner(shard, ctx, songbird).await }));
        }
        Ok(())
    }

    pub async fn disconnect(&mut self) {
        for sender in &self.shard_senders {
            if let Err(e) = sender.close(CloseFrame::NORMAL) {
                debug!("(DiscordPlatform) shard already closed => {e}");
            }
        }
        for task in self.shard_tasks.drain(..) {
            if let Err(e) = task.await {
                warn!("(DiscordPlatform) shard task ended abnormally => {e}");
            }
        }
        self.shard_senders.clear();
        info!("(DiscordPlatform) disconnected");
    }
}
