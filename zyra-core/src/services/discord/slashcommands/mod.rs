// File: zyra-core/src/services/discord/slashcommands/mod.rs

pub mod buttons;
pub mod command;
pub mod definitions;
pub mod help;
pub mod invocation;
pub mod lyrics;
pub mod playback;
pub mod queue;
pub mod reply;
pub mod search;
pub mod spotify;

use std::sync::Arc;

use tracing::{debug, info, warn};
use twilight_http::Client as HttpClient;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::application::interaction::{Interaction, InteractionData};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

use crate::Error;
use crate::platforms::discord::panel::buttons as button_ids;
use crate::services::discord::DiscordContext;
use crate::services::discord::slashcommands::command::MusicCommand;
use crate::services::discord::slashcommands::invocation::Invocation;
use crate::services::discord::slashcommands::reply::{defer, edit_deferred, send_reply, Reply, ReplyKind};

pub async fn register_global_slash_commands(
    http: &Arc<HttpClient>,
    application_id: Id<ApplicationMarker>,
) -> Result<(), Error> {
    let commands = definitions::all_commands();
    http.interaction(application_id)
        .set_global_commands(&commands)
        .await
        .map_err(|e| Error::Platform(format!("Failed to register global slash commands: {e}")))?;
    info!("(SlashCommands) registered {} global commands", commands.len());
    Ok(())
}

/// Dispatch slash commands and panel components from an `InteractionCreate`.
pub async fn handle_interaction_create(ctx: Arc<DiscordContext>, event: Box<InteractionCreate>) -> Result<(), Error> {
    let interaction = &event.0;
    match &interaction.data {
        Some(InteractionData::ApplicationCommand(data)) => handle_command(&ctx, interaction, data).await,
        Some(InteractionData::MessageComponent(data)) => handle_component(&ctx, interaction, data).await,
        _ => {
            debug!("(SlashCommands) ignoring interaction {:?}", interaction.kind);
            Ok(())
        }
    }
}

async fn handle_command(ctx: &DiscordContext, interaction: &Interaction, data: &CommandData) -> Result<(), Error> {
    let command = match MusicCommand::parse(&data.name, &data.options) {
        Ok(command) => command,
        Err(e) => return send_reply(ctx, interaction, Reply::error(&e)).await,
    };
    if command == MusicCommand::Help {
        return send_reply(ctx, interaction, Reply::embed(help::help_embed())).await;
    }
    let inv = match Invocation::from_interaction(interaction) {
        Ok(inv) => inv,
        Err(e) => return send_reply(ctx, interaction, Reply::error(&e)).await,
    };

    if command.defers() {
        defer(ctx, interaction, ReplyKind::Message).await?;
        let reply = run_command(ctx, &inv, command).await.unwrap_or_else(|e| {
            warn!("(SlashCommands) /{} from {} failed => {e}", data.name, inv.display_name);
            Reply::error(&e)
        });
        edit_deferred(ctx, interaction, reply).await
    } else {
        let reply = run_command(ctx, &inv, command).await.unwrap_or_else(|e| {
            debug!("(SlashCommands) /{} from {} rejected => {e}", data.name, inv.display_name);
            Reply::error(&e)
        });
        send_reply(ctx, interaction, reply).await
    }
}

async fn run_command(ctx: &DiscordContext, inv: &Invocation, command: MusicCommand) -> Result<Reply, Error> {
    match command {
        MusicCommand::Play { query } => playback::handle_play(ctx, inv, &query).await,
        MusicCommand::Join => playback::handle_join(ctx, inv).await,
        MusicCommand::Pause => playback::handle_pause(ctx, inv).await,
        MusicCommand::Resume => playback::handle_resume(ctx, inv).await,
        MusicCommand::Skip => playback::handle_skip(ctx, inv).await,
        MusicCommand::SkipTo { position } => playback::handle_skip_to(ctx, inv, position).await,
        MusicCommand::Stop => playback::handle_stop(ctx, inv).await,
        MusicCommand::Queue { page } => queue::handle_queue(ctx, inv, page).await,
        MusicCommand::NowPlaying => queue::handle_now_playing(ctx, inv).await,
        MusicCommand::Volume { level } => queue::handle_volume(ctx, inv, level).await,
        MusicCommand::Loop { mode } => queue::handle_loop(ctx, inv, mode).await,
        MusicCommand::Shuffle => queue::handle_shuffle(ctx, inv).await,
        MusicCommand::Remove { position } => queue::handle_remove(ctx, inv, position).await,
        MusicCommand::Move { from, to } => queue::handle_move(ctx, inv, from, to).await,
        MusicCommand::Clear => queue::handle_clear(ctx, inv).await,
        MusicCommand::Search { query } => search::handle_search(ctx, inv, &query).await,
        MusicCommand::SpotifyStatus => spotify::handle_spotify_status(ctx).await,
        MusicCommand::Lyrics { query } => lyrics::handle_lyrics(ctx, inv, query.as_deref()).await,
        MusicCommand::Help => Ok(Reply::embed(help::help_embed())),
    }
}

async fn handle_component(
    ctx: &DiscordContext,
    interaction: &Interaction,
    data: &MessageComponentInteractionData,
) -> Result<(), Error> {
    let inv = match Invocation::from_interaction(interaction) {
        Ok(inv) => inv,
        Err(e) => return send_reply(ctx, interaction, Reply::error(&e)).await,
    };

    if data.custom_id == button_ids::SEARCH_SELECT {
        // Resolving and joining can outlast the 3 second response window.
        defer(ctx, interaction, ReplyKind::UpdateSource).await?;
        let reply = search::handle_search_select(ctx, &inv, &data.values)
            .await
            .unwrap_or_else(|e| {
                warn!("(SlashCommands) search pick from {} failed => {e}", inv.display_name);
                Reply::error(&e)
            });
        return edit_deferred(ctx, interaction, reply).await;
    }

    let reply = buttons::handle_button(ctx, &inv, &data.custom_id)
        .await
        .unwrap_or_else(|e| Reply::error(&e));
    send_reply(ctx, interaction, reply).await
}
