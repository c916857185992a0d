// File: zyra-core/src/services/discord/slashcommands/queue.rs

use zyra_common::models::RepeatMode;

use crate::Error;
use crate::platforms::discord::panel::{panel_components, panel_embed, queue_embed, success_embed};
use crate::services::discord::DiscordContext;
use crate::services::discord::slashcommands::invocation::{require_control, require_session, Invocation};
use crate::services::discord::slashcommands::reply::Reply;

pub async fn handle_queue(ctx: &DiscordContext, inv: &Invocation, page: usize) -> Result<Reply, Error> {
    let queue = require_session(ctx, inv)?;
    let snapshot = queue.snapshot().await;
    Ok(Reply::embed(queue_embed(&snapshot, page.saturating_sub(1))))
}

pub async fn handle_now_playing(ctx: &DiscordContext, inv: &Invocation) -> Result<Reply, Error> {
    let queue = require_session(ctx, inv)?;
    let panel = queue
        .now_playing()
        .await
        .ok_or_else(|| Error::InvalidState("Nothing is playing right now.".into()))?;
    Ok(Reply::embed(panel_embed(&panel)).with_components(panel_components(&panel)))
}

pub async fn handle_volume(ctx: &DiscordContext, inv: &Invocation, level: i64) -> Result<Reply, Error> {
    let queue = require_control(ctx, inv)?;
    let volume = queue.set_volume(level).await?;
    queue.refresh_panel().await;
    Ok(Reply::embed(success_embed(&format!("🔊 Volume set to **{volume}%**"))))
}

pub async fn handle_loop(ctx: &DiscordContext, inv: &Invocation, mode: RepeatMode) -> Result<Reply, Error> {
    let queue = require_control(ctx, inv)?;
    queue.set_repeat_mode(mode).await;
    queue.refresh_panel().await;
    let text = match mode {
        RepeatMode::Off => "➡️ Loop disabled".to_string(),
        RepeatMode::Single => "🔂 Now looping the current **song**".to_string(),
        RepeatMode::All => "🔁 Now looping the **queue**".to_string(),
    };
    Ok(Reply::embed(success_embed(&text)))
}

pub async fn handle_shuffle(ctx: &DiscordContext, inv: &Invocation) -> Result<Reply, Error> {
    let queue = require_control(ctx, inv)?;
    queue.shuffle().await?;
    queue.refresh_panel().await;
    let upcoming = queue.upcoming_items().await.len();
    Ok(Reply::embed(success_embed(&format!("🔀 Shuffled **{upcoming}** upcoming songs!"))))
}

pub async fn handle_remove(ctx: &DiscordContext, inv: &Invocation, position: usize) -> Result<Reply, Error> {
    let queue = require_control(ctx, inv)?;
    let removed = queue.remove(position).await?;
    queue.refresh_panel().await;
    Ok(Reply::embed(success_embed(&format!("Removed **{}** from the queue", removed.title))))
}

pub async fn handle_move(ctx: &DiscordContext, inv: &Invocation, from: usize, to: usize) -> Result<Reply, Error> {
    let queue = require_control(ctx, inv)?;
    let moved = queue.move_item(from, to).await?;
    queue.refresh_panel().await;
    Ok(Reply::embed(success_embed(&format!(
        "Moved **{}** to position **{to}**",
        moved.title
    ))))
}

pub async fn handle_clear(ctx: &DiscordContext, inv: &Invocation) -> Result<Reply, Error> {
    let queue = require_control(ctx, inv)?;
    let cleared = queue.clear().await;
    queue.refresh_panel().await;
    Ok(Reply::embed(success_embed(&format!("🗑️ Cleared **{cleared}** songs from the queue"))))
}
