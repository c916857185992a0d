use once_cell::sync::Lazy;
use regex::Regex;

static VIDEO_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(m\.|music\.)?(youtube\.com|youtu\.?be)/.+$").expect("static regex")
});
static LIST_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]list=([^#&?]*)").expect("static regex"));

/// Any YouTube page URL, including ones carrying a `list=` parameter.
pub fn is_youtube_url(query: &str) -> bool {
    VIDEO_URL.is_match(query.trim())
}

/// The `list=` id of a YouTube URL, if it has a non-empty one.
pub fn playlist_id(query: &str) -> Option<&str> {
    let q = query.trim();
    if !is_youtube_url(q) {
        return None;
    }
    LIST_PARAM
        .captures(q)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|id| !id.is_empty())
}

/// Auto-generated mixes ("RD..." lists) cannot be enumerated.
pub fn is_mix(list_id: &str) -> bool {
    list_id.starts_with("RD")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_video_hosts() {
        assert!(is_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_youtube_url("youtu.be/dQw4w9WgXcQ"));
        assert!(is_youtube_url("https://music.youtube.com/watch?v=abc"));
        assert!(is_youtube_url("https://m.youtube.com/watch?v=abc"));
        assert!(!is_youtube_url("https://vimeo.com/123"));
        assert!(!is_youtube_url("rick astley"));
    }

    #[test]
    fn extracts_list_ids() {
        assert_eq!(
            playlist_id("https://www.youtube.com/playlist?list=PL123abc"),
            Some("PL123abc")
        );
        assert_eq!(
            playlist_id("https://www.youtube.com/watch?v=x&list=RDx&index=2"),
            Some("RDx")
        );
        assert_eq!(playlist_id("https://www.youtube.com/watch?v=x"), None);
        assert_eq!(playlist_id("https://www.youtube.com/watch?v=x&list="), None);
        assert!(is_mix("RDdQw4w9WgXcQ"));
        assert!(!is_mix("PL123"));
    }
}
