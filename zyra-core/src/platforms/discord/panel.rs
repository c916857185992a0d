// File: zyra-core/src/platforms/discord/panel.rs
//
// Embeds and control rows. Everything here is pure rendering.

use twilight_model::channel::message::component::{ActionRow, Button, ButtonStyle};
use twilight_model::channel::message::{Component, Embed, EmojiReactionType};
use twilight_util::builder::embed::{
    EmbedAuthorBuilder, EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder, ImageSource,
};

use zyra_common::models::{CatalogOrigin, MediaItem, NowPlayingPanel, QueueSnapshot, RepeatMode};

use crate::services::music::EnqueueOutcome;
use crate::utils::time::{format_duration, progress_bar, slider, total_duration};

pub mod colors {
    pub const PRIMARY: u32 = 0x000000;
    pub const SUCCESS: u32 = 0x00C851;
    pub const WARNING: u32 = 0xFFBB33;
    pub const ERROR: u32 = 0xFF4444;
    pub const INFO: u32 = 0x33B5E5;
    pub const MUSIC: u32 = 0x1A1A1A;
    pub const SPOTIFY: u32 = 0x1DB954;
    pub const YOUTUBE: u32 = 0xFF0000;
}

pub mod buttons {
    pub const PREVIOUS: &str = "music_previous";
    pub const PAUSE: &str = "music_pause";
    pub const SKIP: &str = "music_skip";
    pub const STOP: &str = "music_stop";
    pub const SHUFFLE: &str = "music_shuffle";
    pub const LOOP: &str = "music_loop";
    pub const VOLUME_DOWN: &str = "music_voldown";
    pub const VOLUME_UP: &str = "music_volup";
    pub const QUEUE: &str = "music_queue";
    pub const REFRESH: &str = "music_refresh";
    pub const SEARCH_SELECT: &str = "search_select";
}

pub const QUEUE_PAGE_SIZE: usize = 8;
const PROGRESS_LEN: usize = 15;
const VOLUME_SLIDER_LEN: usize = 10;
const FOOTER: &str = "Zyra Music • Live Controller";

/// Discord rejects over-long embed strings; cut on a char boundary.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn with_thumbnail(builder: EmbedBuilder, url: Option<&str>) -> EmbedBuilder {
    match url.map(ImageSource::url) {
        Some(Ok(source)) => builder.thumbnail(source),
        _ => builder,
    }
}

fn volume_icon(volume: u8) -> &'static str {
    match volume {
        v if v > 66 => "🔊",
        v if v > 33 => "🔉",
        _ => "🔈",
    }
}

fn repeat_label(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::Off => "Off",
        RepeatMode::Single => "🔂 Song",
        RepeatMode::All => "🔁 Queue",
    }
}

fn duration_label(item: &MediaItem) -> String {
    if item.duration_secs == 0 {
        "Live".to_string()
    } else {
        format_duration(item.duration_secs)
    }
}

fn simple(color: u32, icon: &str, description: &str) -> Embed {
    EmbedBuilder::new()
        .color(color)
        .description(truncate(&format!("{icon} {description}"), 4000))
        .build()
}

pub fn success_embed(description: &str) -> Embed {
    simple(colors::SUCCESS, "✅", description)
}

pub fn error_embed(description: &str) -> Embed {
    simple(colors::ERROR, "❌", description)
}

pub fn info_embed(description: &str) -> Embed {
    simple(colors::INFO, "ℹ️", description)
}

pub fn warning_embed(description: &str) -> Embed {
    simple(colors::WARNING, "⚠️", description)
}

pub fn panel_embed(panel: &NowPlayingPanel) -> Embed {
    let item = &panel.item;
    let from_spotify = panel.from_secondary();
    let author = match (from_spotify, panel.paused) {
        (_, true) => "⏸️ PAUSED",
        (true, false) => "🟢 SPOTIFY → NOW PLAYING",
        (false, false) => "🔴 NOW PLAYING",
    };

    let description = format!(
        "**{}**\n\n⏱️ `{} {} {}`\n👤 {}\n{} `{}%` {} • {} • `{} songs`",
        item.uploader,
        format_duration(panel.elapsed_secs),
        progress_bar(panel.elapsed_secs, item.duration_secs, PROGRESS_LEN),
        duration_label(item),
        item.requested_by.display_name,
        volume_icon(panel.volume),
        panel.volume,
        slider(u64::from(panel.volume), 100, VOLUME_SLIDER_LEN),
        repeat_label(panel.repeat),
        panel.queue_len,
    );

    let preview = if panel.preview.is_empty() {
        "*No upcoming songs*".to_string()
    } else {
        panel
            .preview
            .iter()
            .enumerate()
            .map(|(i, s)| format!("`{}.` **{}** - *{}*", i + 1, truncate(&s.title, 60), s.uploader))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let builder = EmbedBuilder::new()
        .color(if from_spotify { colors::SPOTIFY } else { colors::PRIMARY })
        .author(EmbedAuthorBuilder::new(author))
        .title(truncate(&item.title, 256))
        .url(item.source_url.clone())
        .description(description)
        .field(EmbedFieldBuilder::new("📋 Queue Preview", truncate(&preview, 1024)))
        .footer(EmbedFooterBuilder::new(format!(
            "{FOOTER} {}",
            if from_spotify { "🟢" } else { "🔴" }
        )));
    with_thumbnail(builder, item.thumbnail_url.as_deref()).build()
}

fn button(custom_id: &str, emoji: &str, label: &str, style: ButtonStyle, disabled: bool) -> Component {
    Component::Button(Button {
        custom_id: Some(custom_id.to_string()),
        disabled,
        emoji: Some(EmojiReactionType::Unicode {
            name: emoji.to_string(),
        }),
        label: Some(label.to_string()),
        style,
        url: None,
        sku_id: None,
    })
}

pub fn panel_components(panel: &NowPlayingPanel) -> Vec<Component> {
    let (pause_emoji, pause_label, pause_style) = if panel.paused {
        ("▶️", "Play", ButtonStyle::Success)
    } else {
        ("⏸️", "Pause", ButtonStyle::Primary)
    };
    let loop_style = if panel.repeat == RepeatMode::Off {
        ButtonStyle::Secondary
    } else {
        ButtonStyle::Success
    };

    let transport_row = ActionRow {
        components: vec![
            button(buttons::SHUFFLE, "🔀", "Shuffle", ButtonStyle::Secondary, false),
            button(buttons::PREVIOUS, "⏮️", "Previous", ButtonStyle::Secondary, true),
            button(buttons::PAUSE, pause_emoji, pause_label, pause_style, false),
            button(buttons::SKIP, "⏭️", "Skip", ButtonStyle::Secondary, false),
            button(buttons::STOP, "⏹️", "Stop", ButtonStyle::Danger, false),
        ],
    };
    let settings_row = ActionRow {
        components: vec![
            button(buttons::VOLUME_DOWN, "🔉", "Vol -", ButtonStyle::Secondary, panel.volume == 0),
            button(buttons::VOLUME_UP, "🔊", "Vol +", ButtonStyle::Secondary, panel.volume >= 100),
            button(buttons::LOOP, "🔁", "Loop", loop_style, false),
            button(buttons::QUEUE, "📋", "Queue", ButtonStyle::Secondary, false),
            button(buttons::REFRESH, "🔄", "Refresh", ButtonStyle::Secondary, false),
        ],
    };
    vec![Component::ActionRow(transport_row), Component::ActionRow(settings_row)]
}

pub fn page_count(snapshot: &QueueSnapshot) -> usize {
    snapshot.len().div_ceil(QUEUE_PAGE_SIZE).max(1)
}

/// One page of the queue; `page` is 0-based and clamped.
pub fn queue_embed(snapshot: &QueueSnapshot, page: usize) -> Embed {
    let pages = page_count(snapshot);
    let page = page.min(pages - 1);
    let all: Vec<&MediaItem> = snapshot.current.iter().chain(snapshot.upcoming.iter()).collect();

    let lines: Vec<String> = all
        .iter()
        .enumerate()
        .skip(page * QUEUE_PAGE_SIZE)
        .take(QUEUE_PAGE_SIZE)
        .map(|(position, song)| {
            let prefix = if position == 0 && snapshot.current.is_some() {
                "▶️ **Now:**".to_string()
            } else {
                format!("`{position:02}.`")
            };
            let origin = if song.origin == CatalogOrigin::Secondary { " 🟢" } else { "" };
            format!(
                "{prefix} **[{}]({})**{origin}\n• *{}* • `{}`",
                truncate(&song.title, 80),
                song.source_url,
                song.uploader,
                duration_label(song)
            )
        })
        .collect();

    let description = if lines.is_empty() {
        "ℹ️ Queue is empty\n\nUse `/play` to add some music!".to_string()
    } else {
        lines.join("\n\n")
    };
    let total = format_duration(total_duration(all.iter().copied()));

    EmbedBuilder::new()
        .color(colors::MUSIC)
        .title("📋 Music Queue")
        .description(truncate(&description, 4000))
        .field(EmbedFieldBuilder::new(
            "ℹ️ Queue Stats",
            format!(
                "**Songs:** `{}` • **Duration:** `{total}` • **Loop:** `{}` • **Page:** `{}/{pages}`",
                snapshot.len(),
                snapshot.repeat.label(),
                page + 1
            ),
        ))
        .footer(EmbedFooterBuilder::new(format!("Zyra Music • Page {} of {pages}", page + 1)))
        .build()
}

/// Reply for `/play` and the search menu.
pub fn enqueued_embed(outcome: &EnqueueOutcome, requester_mention: &str) -> Embed {
    match outcome {
        EnqueueOutcome::Single { item, position } => {
            let from_spotify = item.origin == CatalogOrigin::Secondary;
            let (title, color) = if *position == 0 {
                ("🎵 Now Playing", if from_spotify { colors::SPOTIFY } else { colors::PRIMARY })
            } else {
                ("✅ Added to Queue", colors::SUCCESS)
            };
            let position_label = if *position == 0 {
                "`Now`".to_string()
            } else {
                format!("`#{position}`")
            };
            let builder = EmbedBuilder::new()
                .color(color)
                .title(title)
                .description(truncate(
                    &format!("**[{}]({})**\n*{}*", item.title, item.source_url, item.uploader),
                    4000,
                ))
                .field(EmbedFieldBuilder::new("⏱️ Duration", format!("`{}`", duration_label(item))).inline())
                .field(EmbedFieldBuilder::new("👤 Requested", requester_mention).inline())
                .field(EmbedFieldBuilder::new("📋 Position", position_label).inline())
                .footer(EmbedFooterBuilder::new(if from_spotify {
                    "Converted from Spotify 🟢"
                } else {
                    "YouTube Audio 🔴"
                }));
            with_thumbnail(builder, item.thumbnail_url.as_deref()).build()
        }
        EnqueueOutcome::Collection {
            title,
            url,
            thumbnail_url,
            added,
            pending,
        } => {
            let from_spotify = *pending > 0 || url.contains("spotify.com");
            let platform = if from_spotify { "Spotify" } else { "YouTube" };
            let mut description = if url.is_empty() {
                format!("**{title}**")
            } else {
                format!("**[{title}]({url})**")
            };
            if *pending > 0 {
                description.push_str(&format!("\n\n⏳ Loading {pending} more song(s) in the background…"));
            }
            let builder = EmbedBuilder::new()
                .color(if from_spotify { colors::SPOTIFY } else { colors::YOUTUBE })
                .title(format!("✅ Added {platform} Playlist"))
                .description(truncate(&description, 4000))
                .field(EmbedFieldBuilder::new("🎵 Songs", format!("`{}`", added + pending)).inline())
                .field(EmbedFieldBuilder::new("👤 Requested by", requester_mention).inline())
                .field(EmbedFieldBuilder::new(
                    format!("{} Platform", if from_spotify { "🟢" } else { "🔴" }),
                    format!("`{platform}`"),
                ).inline())
                .footer(EmbedFooterBuilder::new(format!("{platform} Playlist • {added} tracks added")));
            with_thumbnail(builder, thumbnail_url.as_deref()).build()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zyra_common::models::{Requester, SessionId};

    fn item(title: &str, secs: u64) -> MediaItem {
        MediaItem {
            title: title.into(),
            source_url: format!("https://youtu.be/{title}"),
            duration_secs: secs,
            thumbnail_url: Some("https://i.ytimg.com/x.jpg".into()),
            uploader: "Uploader".into(),
            requested_by: Requester::new(42, "dj"),
            origin: CatalogOrigin::Primary,
            cross_ref: None,
        }
    }

    fn panel(paused: bool, repeat: RepeatMode) -> NowPlayingPanel {
        NowPlayingPanel {
            item: item("Song", 180),
            elapsed_secs: 90,
            volume: 50,
            repeat,
            paused,
            queue_len: 2,
            preview: vec![item("Next", 200)],
        }
    }

    fn button_ids(rows: &[Component]) -> Vec<(String, bool)> {
        rows.iter()
            .flat_map(|row| match row {
                Component::ActionRow(r) => r.components.clone(),
                _ => Vec::new(),
            })
            .filter_map(|c| match c {
                Component::Button(b) => b.custom_id.map(|id| (id, b.disabled)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 10), "héllo");
        assert_eq!(truncate("héllo wörld", 5), "héll…");
    }

    #[test]
    fn panel_embed_shows_progress_and_preview() {
        let embed = panel_embed(&panel(false, RepeatMode::Off));
        let description = embed.description.unwrap();
        assert!(description.contains("1:30"));
        assert!(description.contains("3:00"));
        assert!(description.contains("`50%`"));
        assert_eq!(embed.title.as_deref(), Some("Song"));
        assert!(embed.fields[0].value.contains("**Next**"));
        assert!(embed.thumbnail.is_some());
    }

    #[test]
    fn panel_buttons_cover_every_control() {
        let ids = button_ids(&panel_components(&panel(true, RepeatMode::All)));
        assert_eq!(ids.len(), 10);
        assert!(ids.contains(&(buttons::PREVIOUS.to_string(), true)));
        assert!(ids.contains(&(buttons::PAUSE.to_string(), false)));
        assert!(ids.contains(&(buttons::REFRESH.to_string(), false)));
    }

    #[test]
    fn queue_embed_numbers_upcoming_from_one() {
        let snapshot = QueueSnapshot {
            session_id: SessionId(1),
            current: Some(item("A", 60)),
            upcoming: vec![item("B", 60), item("C", 60)],
            volume: 50,
            playing: true,
            paused: false,
            repeat: RepeatMode::Off,
            elapsed_secs: 0,
        };
        let description = queue_embed(&snapshot, 0).description.unwrap();
        assert!(description.contains("**Now:** **[A]"));
        assert!(description.contains("`01.` **[B]"));
        assert!(description.contains("`02.` **[C]"));
        assert_eq!(page_count(&snapshot), 1);
    }

    #[test]
    fn empty_queue_embed_has_hint() {
        let snapshot = QueueSnapshot {
            session_id: SessionId(1),
            current: None,
            upcoming: Vec::new(),
            volume: 50,
            playing: false,
            paused: false,
            repeat: RepeatMode::Off,
            elapsed_secs: 0,
        };
        assert!(queue_embed(&snapshot, 3).description.unwrap().contains("Queue is empty"));
    }
}
