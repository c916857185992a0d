pub mod client;

pub use client::{chunk_lyrics, Lyrics, LyricsClient, LyricsSong, LYRICS_CHUNK_CHARS};
