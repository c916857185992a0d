pub mod auth;
pub mod client;
pub mod urls;

pub use auth::SpotifyCredentials;
pub use client::SpotifyClient;
pub use urls::{is_spotify_url, parse_link, SpotifyLink};
