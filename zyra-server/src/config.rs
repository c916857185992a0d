// File: zyra-server/src/config.rs

use clap::Parser;

use zyra_core::Error;
use zyra_core::matching::ResolverConfig;
use zyra_core::platforms::spotify::SpotifyCredentials;
use zyra_core::services::music::{LocatorConfig, MusicConfig, QueueSettings};

#[derive(Parser, Debug, Clone)]
#[command(name = "zyra")]
#[command(author, version, about = "Zyra - Discord music bot for YouTube and Spotify")]
pub struct Args {
    /// Discord bot token.
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: String,

    /// Spotify client id; Spotify links are disabled without it.
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    pub spotify_client_id: Option<String>,

    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: Option<String>,

    /// Port of the health endpoint.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long, env = "YTDLP_PATH", default_value = "yt-dlp")]
    pub ytdlp_path: String,

    /// Minimum score for a Spotify track to count as found on YouTube.
    #[arg(long, env = "MATCH_THRESHOLD", default_value_t = 0.35)]
    pub match_threshold: f64,

    #[arg(long, env = "DEFAULT_VOLUME", default_value_t = 50,
          value_parser = clap::value_parser!(u8).range(0..=100))]
    pub default_volume: u8,

    /// Most members taken from any playlist.
    #[arg(long, env = "PLAYLIST_LIMIT", default_value_t = 500)]
    pub playlist_limit: usize,

    /// Spotify playlist members matched before replying.
    #[arg(long, env = "EAGER_MEMBERS", default_value_t = 3)]
    pub eager_members: usize,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Args {
    /// Both or neither.
    pub fn spotify_credentials(&self) -> Result<Option<SpotifyCredentials>, Error> {
        match (non_blank(&self.spotify_client_id), non_blank(&self.spotify_client_secret)) {
            (Some(client_id), Some(client_secret)) => Ok(Some(SpotifyCredentials {
                client_id,
                client_secret,
            })),
            (None, None) => Ok(None),
            _ => Err(Error::Config(
                "SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET must be set together".into(),
            )),
        }
    }

    pub fn resolver_config(&self) -> Result<ResolverConfig, Error> {
        if !(0.0..1.0).contains(&self.match_threshold) {
            return Err(Error::Config(format!(
                "MATCH_THRESHOLD must be in [0, 1), got {}",
                self.match_threshold
            )));
        }
        Ok(ResolverConfig {
            threshold: self.match_threshold,
            ..ResolverConfig::default()
        })
    }

    pub fn music_config(&self) -> Result<MusicConfig, Error> {
        if self.playlist_limit == 0 {
            return Err(Error::Config("PLAYLIST_LIMIT must be at least 1".into()));
        }
        Ok(MusicConfig {
            queue: QueueSettings {
                default_volume: self.default_volume,
                ..QueueSettings::default()
            },
            locator: LocatorConfig {
                playlist_limit: self.playlist_limit,
                eager_members: self.eager_members,
            },
            ..MusicConfig::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        let mut argv = vec!["zyra", "--discord-token", "token"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv)
    }

    #[test]
    fn spotify_credentials_come_in_pairs() {
        let both = parse(&["--spotify-client-id", "id", "--spotify-client-secret", "secret"]).unwrap();
        assert_eq!(both.spotify_credentials().unwrap().unwrap().client_id, "id");

        let half = parse(&["--spotify-client-id", "id", "--spotify-client-secret", " "]).unwrap();
        assert!(matches!(half.spotify_credentials(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(parse(&["--default-volume", "150"]).is_err());
        let args = parse(&["--match-threshold", "1.5"]).unwrap();
        assert!(args.resolver_config().is_err());
        let args = parse(&["--playlist-limit", "0"]).unwrap();
        assert!(args.music_config().is_err());
    }

    #[test]
    fn carries_settings_into_music_config() {
        let args = parse(&["--default-volume", "80", "--eager-members", "5", "--match-threshold", "0.5"]).unwrap();
        let music = args.music_config().unwrap();
        assert_eq!(music.queue.default_volume, 80);
        assert_eq!(music.locator.eager_members, 5);
        assert_eq!(args.resolver_config().unwrap().threshold, 0.5);
    }
}
