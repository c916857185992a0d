// File: zyra-core/src/services/discord/slashcommands/reply.rs

use twilight_model::application::interaction::Interaction;
use twilight_model::channel::message::{Component, Embed, MessageFlags};
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseType};
use twilight_util::builder::InteractionResponseDataBuilder;

use crate::Error;
use crate::platforms::discord::panel::error_embed;
use crate::services::discord::DiscordContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// A new message answering the interaction.
    Message,
    /// Edit the message the component lives on.
    UpdateSource,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub embeds: Vec<Embed>,
    pub components: Vec<Component>,
    pub ephemeral: bool,
    pub kind: ReplyKind,
    /// Sent as follow-up messages after the response, one embed each.
    pub followups: Vec<Embed>,
}

impl Reply {
    pub fn embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            components: Vec::new(),
            ephemeral: false,
            kind: ReplyKind::Message,
            followups: Vec::new(),
        }
    }

    pub fn ephemeral(embed: Embed) -> Self {
        Self {
            ephemeral: true,
            ..Self::embed(embed)
        }
    }

    pub fn error(err: &Error) -> Self {
        Self::ephemeral(error_embed(&user_message(err)))
    }

    pub fn with_components(mut self, components: Vec<Component>) -> Self {
        self.components = components;
        self
    }

    pub fn with_followups(mut self, followups: Vec<Embed>) -> Self {
        self.followups = followups;
        self
    }

    pub fn updating_source(mut self) -> Self {
        self.kind = ReplyKind::UpdateSource;
        self.ephemeral = false;
        self
    }
}

/// The part of an error a user should see.
pub fn user_message(err: &Error) -> String {
    match err {
        Error::NotFound(s)
        | Error::UnsupportedInput(s)
        | Error::OutOfRange(s)
        | Error::InvalidState(s)
        | Error::AlreadyExists(s)
        | Error::InsufficientItems(s)
        | Error::Timeout(s)
        | Error::Parse(s) => s.clone(),
        Error::UpstreamFailure(s) => format!("The music source failed: {s}"),
        Error::Auth(_) => "Could not authenticate with the music service.".to_string(),
        _ => "Something went wrong, please try again.".to_string(),
    }
}

pub async fn send_reply(ctx: &DiscordContext, interaction: &Interaction, reply: Reply) -> Result<(), Error> {
    let kind = match reply.kind {
        ReplyKind::Message => InteractionResponseType::ChannelMessageWithSource,
        ReplyKind::UpdateSource => InteractionResponseType::UpdateMessage,
    };
    let mut data = InteractionResponseDataBuilder::new()
        .embeds(reply.embeds)
        .components(reply.components);
    let followups = reply.followups;
    if reply.ephemeral {
        data = data.flags(MessageFlags::EPHEMERAL);
    }
    let response = InteractionResponse {
        kind,
        data: Some(data.build()),
    };

    ctx.http
        .interaction(interaction.application_id)
        .create_response(interaction.id, &interaction.token, &response)
        .await
        .map_err(|e| Error::Platform(format!("Error responding to interaction: {e}")))?;
    send_followups(ctx, interaction, &followups).await
}

/// Acknowledges now, answers later with [`edit_deferred`].
pub async fn defer(ctx: &DiscordContext, interaction: &Interaction, kind: ReplyKind) -> Result<(), Error> {
    let kind = match kind {
        ReplyKind::Message => InteractionResponseType::DeferredChannelMessageWithSource,
        ReplyKind::UpdateSource => InteractionResponseType::DeferredUpdateMessage,
    };
    ctx.http
        .interaction(interaction.application_id)
        .create_response(
            interaction.id,
            &interaction.token,
            &InteractionResponse { kind, data: None },
        )
        .await
        .map_err(|e| Error::Platform(format!("Error deferring interaction: {e}")))?;
    Ok(())
}

pub async fn edit_deferred(ctx: &DiscordContext, interaction: &Interaction, reply: Reply) -> Result<(), Error> {
    ctx.http
        .interaction(interaction.application_id)
        .update_response(&interaction.token)
        .embeds(Some(reply.embeds.as_slice()))
        .components(Some(reply.components.as_slice()))
        .await
        .map_err(|e| Error::Platform(format!("Error editing interaction response: {e}")))?;
    send_followups(ctx, interaction, &reply.followups).await
}

async fn send_followups(ctx: &DiscordContext, interaction: &Interaction, followups: &[Embed]) -> Result<(), Error> {
    for embed in followups {
        ctx.http
            .interaction(interaction.application_id)
            .create_followup(&interaction.token)
            .embeds(std::slice::from_ref(embed))
            .await
            .map_err(|e| Error::Platform(format!("Error sending follow-up: {e}")))?;
    }
    Ok(())
}
