// File: zyra-core/src/services/discord/slashcommands/playback.rs

use tracing::info;

use crate::Error;
use crate::platforms::discord::panel::{enqueued_embed, info_embed, success_embed};
use crate::services::discord::DiscordContext;
use crate::services::discord::slashcommands::invocation::{require_control, require_voice, Invocation};
use crate::services::discord::slashcommands::reply::Reply;

pub async fn handle_play(ctx: &DiscordContext, inv: &Invocation, query: &str) -> Result<Reply, Error> {
    let voice = require_voice(ctx, inv)?;
    info!("(/play) {} in session {} => '{query}'", inv.display_name, inv.session);
    let outcome = ctx
        .music
        .play_query(
            inv.session,
            voice,
            ctx.notifier_for(inv.channel_id),
            query,
            &inv.requester(),
        )
        .await?;
    Ok(Reply::embed(enqueued_embed(&outcome, &inv.mention())))
}

pub async fn handle_join(ctx: &DiscordContext, inv: &Invocation) -> Result<Reply, Error> {
    let voice = require_voice(ctx, inv)?;
    if let Some(bot) = ctx.bot_voice_channel(inv.session) {
        if ctx.music.session(inv.session).is_some() {
            return if bot == voice {
                Ok(Reply::ephemeral(info_embed("I'm already in your voice channel!")))
            } else {
                Err(Error::InvalidState("I'm already playing in another voice channel.".into()))
            };
        }
    }
    let (queue, _) = ctx
        .music
        .ensure_session(inv.session, voice, ctx.notifier_for(inv.channel_id))
        .await?;
    // A queue left with items (e.g. after /join on a paused session) resumes.
    queue.start_if_idle().await;
    Ok(Reply::embed(success_embed(&format!("Joined <#{voice}>!"))))
}

pub async fn handle_pause(ctx: &DiscordContext, inv: &Invocation) -> Result<Reply, Error> {
    let queue = require_control(ctx, inv)?;
    queue.pause().await?;
    queue.refresh_panel().await;
    Ok(Reply::embed(success_embed("⏸️ Paused the music.")))
}

pub async fn handle_resume(ctx: &DiscordContext, inv: &Invocation) -> Result<Reply, Error> {
    let queue = require_control(ctx, inv)?;
    queue.resume().await?;
    queue.refresh_panel().await;
    Ok(Reply::embed(success_embed("▶️ Resumed the music.")))
}

pub async fn handle_skip(ctx: &DiscordContext, inv: &Invocation) -> Result<Reply, Error> {
    let queue = require_control(ctx, inv)?;
    let title = queue.current_item().await.map(|i| i.title).unwrap_or_default();
    queue.skip().await?;
    Ok(Reply::embed(success_embed(&format!("Skipped **{title}**"))))
}

pub async fn handle_skip_to(ctx: &DiscordContext, inv: &Invocation, position: usize) -> Result<Reply, Error> {
    let queue = require_control(ctx, inv)?;
    let target = queue.skip_to(position).await?;
    Ok(Reply::embed(success_embed(&format!(
        "Skipped to **{}** (position {position})",
        target.title
    ))))
}

pub async fn handle_stop(ctx: &DiscordContext, inv: &Invocation) -> Result<Reply, Error> {
    require_control(ctx, inv)?;
    ctx.music.disconnect(inv.session).await?;
    Ok(Reply::embed(success_embed(
        "⏹️ Stopped the music and left the voice channel.",
    )))
}
