// File: zyra-core/src/services/discord/slashcommands/spotify.rs

use tracing::warn;

use crate::Error;
use crate::platforms::discord::panel::{error_embed, success_embed, warning_embed};
use crate::services::discord::DiscordContext;
use crate::services::discord::slashcommands::reply::Reply;

pub async fn handle_spotify_status(ctx: &DiscordContext) -> Result<Reply, Error> {
    let Some(spotify) = ctx.music.locator().secondary() else {
        return Ok(Reply::embed(warning_embed(
            "Spotify is not configured. Set `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET` to enable Spotify links.",
        )));
    };
    match spotify.check_auth().await {
        Ok(()) => Ok(Reply::embed(success_embed(
            "🟢 Spotify API is connected. Spotify tracks, playlists and albums can be played.",
        ))),
        Err(e) => {
            warn!("(/spotify status) auth check failed => {e}");
            Ok(Reply::embed(error_embed(
                "🔴 Spotify API authentication failed. Check the client credentials.",
            )))
        }
    }
}
