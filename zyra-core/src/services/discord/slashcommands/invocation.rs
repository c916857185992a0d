// File: zyra-core/src/services/discord/slashcommands/invocation.rs

use std::sync::Arc;

use twilight_model::application::interaction::Interaction;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};

use zyra_common::models::{Requester, SessionId};

use crate::Error;
use crate::services::discord::DiscordContext;
use crate::services::music::SessionQueue;

/// Who ran a command, where.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub session: SessionId,
    pub user_id: Id<UserMarker>,
    pub display_name: String,
    pub channel_id: Id<ChannelMarker>,
}

impl Invocation {
    pub fn from_interaction(interaction: &Interaction) -> Result<Self, Error> {
        let guild = interaction
            .guild_id
            .ok_or_else(|| Error::InvalidState("Music commands only work inside a server.".into()))?;
        let channel_id = interaction
            .channel
            .as_ref()
            .map(|c| c.id)
            .ok_or_else(|| Error::InvalidState("Could not tell which channel this came from.".into()))?;
        let user = interaction
            .author()
            .ok_or_else(|| Error::InvalidState("Could not tell who ran this command.".into()))?;
        let display_name = interaction
            .member
            .as_ref()
            .and_then(|m| m.nick.clone())
            .or_else(|| user.global_name.clone())
            .unwrap_or_else(|| user.name.clone());

        Ok(Self {
            session: SessionId(guild.get()),
            user_id: user.id,
            display_name,
            channel_id,
        })
    }

    pub fn requester(&self) -> Requester {
        Requester::new(self.user_id.get(), self.display_name.clone())
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.user_id)
    }
}

/// The invoking member's voice channel.
pub fn require_voice(ctx: &DiscordContext, inv: &Invocation) -> Result<u64, Error> {
    ctx.voice_channel_of(inv.session, inv.user_id)
        .ok_or_else(|| Error::InvalidState("You need to be in a voice channel!".into()))
}

pub fn require_session(ctx: &DiscordContext, inv: &Invocation) -> Result<Arc<SessionQueue>, Error> {
    ctx.music
        .session(inv.session)
        .ok_or_else(|| Error::InvalidState("Nothing is playing right now.".into()))
}

/// Live session, and the member is listening in the bot's channel.
pub fn require_control(ctx: &DiscordContext, inv: &Invocation) -> Result<Arc<SessionQueue>, Error> {
    let queue = require_session(ctx, inv)?;
    let mine = require_voice(ctx, inv)?;
    match ctx.bot_voice_channel(inv.session) {
        Some(bot) if bot != mine => Err(Error::InvalidState(
            "You need to be in the same voice channel as me!".into(),
        )),
        _ => Ok(queue),
    }
}
