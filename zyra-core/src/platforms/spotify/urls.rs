use once_cell::sync::Lazy;
use regex::Regex;

static WEB_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"spotify\.com/(?:intl-[a-zA-Z-]+/)?(track|playlist|album)/([a-zA-Z0-9]+)")
        .expect("static regex")
});
static URI_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^spotify:(track|playlist|album):([a-zA-Z0-9]+)$").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpotifyLink {
    Track(String),
    Playlist(String),
    Album(String),
}

/// True for anything that points at Spotify, recognised or not.
pub fn is_spotify_url(query: &str) -> bool {
    let q = query.trim();
    q.contains("open.spotify.com") || q.contains("spotify.link") || q.starts_with("spotify:")
}

pub fn parse_link(query: &str) -> Option<SpotifyLink> {
    let q = query.trim();
    let caps = WEB_LINK.captures(q).or_else(|| URI_LINK.captures(q))?;
    let id = caps.get(2)?.as_str().to_string();
    match caps.get(1)?.as_str() {
        "track" => Some(SpotifyLink::Track(id)),
        "playlist" => Some(SpotifyLink::Playlist(id)),
        "album" => Some(SpotifyLink::Album(id)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_web_links() {
        assert_eq!(
            parse_link("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC?si=xyz"),
            Some(SpotifyLink::Track("4uLU6hMCjMI75M1A2tKUQC".into()))
        );
        assert_eq!(
            parse_link("https://open.spotify.com/intl-de/album/1ATL5GLyefJaxhQzSPVrLX"),
            Some(SpotifyLink::Album("1ATL5GLyefJaxhQzSPVrLX".into()))
        );
        assert_eq!(
            parse_link("spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"),
            Some(SpotifyLink::Playlist("37i9dQZF1DXcBWIGoYBM5M".into()))
        );
    }

    #[test]
    fn other_spotify_pages_are_recognised_but_not_parsed() {
        let artist = "https://open.spotify.com/artist/0TnOYISbd1XYRBk9myaseg";
        assert!(is_spotify_url(artist));
        assert_eq!(parse_link(artist), None);
        assert!(!is_spotify_url("never gonna give you up"));
    }
}
