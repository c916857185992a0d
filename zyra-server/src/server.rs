// File: zyra-server/src/server.rs

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use zyra_common::traits::{PrimaryCatalog, SecondaryCatalog};
use zyra_core::http::HttpClient;
use zyra_core::matching::CatalogResolver;
use zyra_core::platforms::discord::{DiscordPlatform, SongbirdGateway};
use zyra_core::platforms::genius::LyricsClient;
use zyra_core::platforms::spotify::SpotifyClient;
use zyra_core::platforms::youtube::{YouTubeCatalog, YtDlp, YtDlpPipeline};
use zyra_core::services::discord::DiscordContext;
use zyra_core::services::music::{MediaLocator, MusicService, SessionRegistry};
use zyra_core::{DefaultHttpClient, Error};

use crate::config::Args;
use crate::health::{self, HealthState};

/// Wires everything together and runs until Ctrl+C.
pub async fn run_server(args: Args) -> Result<(), Error> {
    let resolver_config = args.resolver_config()?;
    let music_config = args.music_config()?;

    let ytdlp = YtDlp::new(args.ytdlp_path.clone());
    let primary: Arc<dyn PrimaryCatalog> = Arc::new(YouTubeCatalog::new(ytdlp.clone()));

    let secondary: Option<Arc<dyn SecondaryCatalog>> = match args.spotify_credentials()? {
        Some(credentials) => {
            let http: Arc<dyn HttpClient> = Arc::new(DefaultHttpClient::new());
            let client = SpotifyClient::new(http, credentials);
            if let Err(e) = client.check_auth().await {
                warn!("Spotify credentials were rejected => {e}; Spotify links will fail until fixed");
            } else {
                info!("Spotify API connected");
            }
            Some(Arc::new(client))
        }
        None => {
            info!("Spotify is not configured; only YouTube is available");
            None
        }
    };

    let resolver = Arc::new(CatalogResolver::new(primary.clone(), resolver_config));
    let locator = Arc::new(MediaLocator::new(
        primary,
        secondary,
        resolver,
        music_config.locator.clone(),
    ));

    let mut platform = DiscordPlatform::new(args.discord_token.clone());
    let songbird = platform.prepare().await?;

    let registry = Arc::new(SessionRegistry::new());
    let music = Arc::new(MusicService::new(
        registry.clone(),
        Arc::new(SongbirdGateway::new(songbird)),
        Arc::new(YtDlpPipeline::new(ytdlp, reqwest::Client::new())),
        locator,
        music_config,
    ));

    let lyrics = Arc::new(LyricsClient::new(Arc::new(DefaultHttpClient::new())));
    let ctx = Arc::new(DiscordContext::new(
        platform.http(),
        platform.cache(),
        music.clone(),
        lyrics,
    ));
    platform.spawn(ctx)?;

    let shutdown = CancellationToken::new();
    let health_state = HealthState::new(registry, platform.cache());
    let health_task = tokio::spawn(health::serve(args.port, health_state, shutdown.clone()));

    info!("Zyra is running. Press Ctrl+C to stop.");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C => {e}");
    }

    info!("Shutting down...");
    shutdown.cancel();
    music.shutdown().await;
    platform.disconnect().await;
    match health_task.await {
        Ok(Err(e)) => warn!("Health endpoint stopped with an error => {e}"),
        Err(e) => warn!("Health endpoint task failed => {e}"),
        Ok(Ok(())) => {}
    }
    Ok(())
}
