// File: zyra-core/src/services/discord/slashcommands/lyrics.rs

use twilight_model::channel::message::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder, ImageSource};

use crate::Error;
use crate::platforms::discord::panel::truncate;
use crate::platforms::genius::{chunk_lyrics, Lyrics, LYRICS_CHUNK_CHARS};
use crate::services::discord::DiscordContext;
use crate::services::discord::slashcommands::invocation::Invocation;
use crate::services::discord::slashcommands::reply::Reply;

const LYRICS_COLOR: u32 = 0x9B59B6;

/// Without a query, looks up the session's current item.
pub async fn handle_lyrics(ctx: &DiscordContext, inv: &Invocation, query: Option<&str>) -> Result<Reply, Error> {
    let query = match query {
        Some(q) => q.to_string(),
        None => {
            let current = match ctx.music.session(inv.session) {
                Some(queue) => queue.current_item().await,
                None => None,
            };
            current
                .map(|item| item.title)
                .ok_or_else(|| Error::NotFound("No song playing. Please provide a search query.".into()))?
        }
    };

    let lyrics = ctx.lyrics.find(&query).await?;
    Ok(lyrics_reply(&lyrics))
}

/// First chunk on a titled embed, the rest as plain follow-ups.
pub fn lyrics_reply(lyrics: &Lyrics) -> Reply {
    let mut chunks = chunk_lyrics(&lyrics.text, LYRICS_CHUNK_CHARS).into_iter();
    let first = chunks.next().unwrap_or_default();

    let mut head = EmbedBuilder::new()
        .color(LYRICS_COLOR)
        .title(truncate(&format!("🎤 {}", lyrics.song.title), 256))
        .url(lyrics.song.url.clone())
        .description(first)
        .footer(EmbedFooterBuilder::new(format!(
            "Artist: {} • Powered by Genius",
            lyrics.song.artist
        )));
    if let Some(Ok(source)) = lyrics.song.thumbnail.as_deref().map(ImageSource::url) {
        head = head.thumbnail(source);
    }

    let followups: Vec<Embed> = chunks
        .map(|chunk| EmbedBuilder::new().color(LYRICS_COLOR).description(chunk).build())
        .collect();
    Reply::embed(head.build()).with_followups(followups)
}
