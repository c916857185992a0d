// File: zyra-core/src/services/discord/slashcommands/help.rs

use twilight_model::channel::message::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder};

use crate::platforms::discord::panel::colors;

const PLAYBACK: &str = "`/play <query>` play a song, YouTube link or Spotify link\n\
`/search <query>` pick from YouTube results\n\
`/join` join your voice channel\n\
`/pause` `/resume` `/skip` `/stop`\n\
`/skipto <position>` jump ahead in the queue";

const QUEUE: &str = "`/queue [page]` show the queue\n\
`/nowplaying` show the current song\n\
`/remove <position>` `/move <from> <to>` `/clear`\n\
`/shuffle` shuffle upcoming songs\n\
`/loop <mode>` off, song or queue\n\
`/volume <0-100>` set the volume\n\
`/lyrics [query]` lyrics for the current song or a search";

pub fn help_embed() -> Embed {
    EmbedBuilder::new()
        .color(colors::INFO)
        .title("🎵 Music Commands")
        .field(EmbedFieldBuilder::new("▶️ Playback", PLAYBACK))
        .field(EmbedFieldBuilder::new("📋 Queue", QUEUE))
        .field(EmbedFieldBuilder::new("🟢 Spotify", "`/spotify status` check the Spotify connection"))
        .footer(EmbedFooterBuilder::new("Use the buttons on the now playing panel for quick controls"))
        .build()
}
