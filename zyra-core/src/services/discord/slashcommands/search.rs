// File: zyra-core/src/services/discord/slashcommands/search.rs

use tracing::debug;
use twilight_model::channel::message::Component;
use twilight_model::channel::message::component::{ActionRow, SelectMenu, SelectMenuOption, SelectMenuType};
use twilight_model::channel::message::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};

use zyra_common::models::VideoCandidate;

use crate::Error;
use crate::platforms::discord::panel::{buttons, colors, enqueued_embed, truncate};
use crate::services::discord::DiscordContext;
use crate::services::discord::slashcommands::invocation::{require_voice, Invocation};
use crate::services::discord::slashcommands::reply::Reply;
use crate::services::music::locator::corrected_duration;
use crate::utils::time::format_duration;

pub const SEARCH_RESULTS: usize = 10;

fn duration_label(candidate: &VideoCandidate) -> String {
    match corrected_duration(candidate.duration_secs) {
        0 => "Live".to_string(),
        secs => format_duration(secs),
    }
}

pub fn results_embed(query: &str, hits: &[VideoCandidate]) -> Embed {
    let lines: Vec<String> = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "`{}.` **{}**\n• *{}* • `{}`",
                i + 1,
                truncate(&hit.title, 80),
                hit.uploader.as_deref().unwrap_or("Unknown"),
                duration_label(hit)
            )
        })
        .collect();
    EmbedBuilder::new()
        .color(colors::YOUTUBE)
        .title(format!("🔍 Results for \"{}\"", truncate(query, 60)))
        .description(truncate(&lines.join("\n"), 4000))
        .footer(EmbedFooterBuilder::new("Pick a result below to add it to the queue"))
        .build()
}

pub fn results_menu(hits: &[VideoCandidate]) -> Vec<Component> {
    let options = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| SelectMenuOption {
            default: false,
            description: Some(truncate(
                &format!(
                    "{} • {}",
                    hit.uploader.as_deref().unwrap_or("Unknown"),
                    duration_label(hit)
                ),
                100,
            )),
            emoji: None,
            label: truncate(&format!("{}. {}", i + 1, hit.title), 100),
            value: hit.url.clone(),
        })
        .collect();

    vec![Component::ActionRow(ActionRow {
        components: vec![Component::SelectMenu(SelectMenu {
            channel_types: None,
            custom_id: buttons::SEARCH_SELECT.to_string(),
            default_values: None,
            disabled: false,
            kind: SelectMenuType::Text,
            max_values: Some(1),
            min_values: Some(1),
            options: Some(options),
            placeholder: Some("Choose a song".to_string()),
        })],
    })]
}

pub async fn handle_search(ctx: &DiscordContext, inv: &Invocation, query: &str) -> Result<Reply, Error> {
    let hits = ctx.music.locator().primary().search(query, SEARCH_RESULTS).await?;
    let hits: Vec<VideoCandidate> = hits.into_iter().filter(|h| !h.url.is_empty()).collect();
    if hits.is_empty() {
        return Err(Error::NotFound(format!("No results found for \"{query}\"")));
    }
    debug!("(/search) {} hits for {} => '{query}'", hits.len(), inv.display_name);
    Ok(Reply::embed(results_embed(query, &hits)).with_components(results_menu(&hits)))
}

/// A pick from the result menu. Replaces the menu with the enqueue reply.
pub async fn handle_search_select(ctx: &DiscordContext, inv: &Invocation, values: &[String]) -> Result<Reply, Error> {
    let url = values
        .first()
        .ok_or_else(|| Error::Parse("No search result was selected.".into()))?;
    let voice = require_voice(ctx, inv)?;
    let outcome = ctx
        .music
        .play_query(
            inv.session,
            voice,
            ctx.notifier_for(inv.channel_id),
            url,
            &inv.requester(),
        )
        .await?;
    Ok(Reply::embed(enqueued_embed(&outcome, &inv.mention())).updating_source())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, secs: Option<u64>) -> VideoCandidate {
        VideoCandidate {
            title: title.into(),
            url: format!("https://www.youtube.com/watch?v={title}"),
            duration_secs: secs,
            uploader: None,
            thumbnail_url: None,
        }
    }

    #[test]
    fn menu_offers_one_option_per_hit() {
        let hits = vec![hit("a", Some(61)), hit("b", None)];
        let rows = results_menu(&hits);
        let Component::ActionRow(row) = &rows[0] else { panic!("expected a row") };
        let Component::SelectMenu(menu) = &row.components[0] else { panic!("expected a menu") };
        assert_eq!(menu.custom_id, buttons::SEARCH_SELECT);
        let options = menu.options.as_ref().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].value, "https://www.youtube.com/watch?v=a");
        assert_eq!(options[0].label, "1. a");
        assert!(options[1].description.as_ref().unwrap().contains("Live"));
    }

    #[test]
    fn results_list_numbers_hits() {
        let embed = results_embed("lofi", &[hit("first", Some(200))]);
        let description = embed.description.unwrap();
        assert!(description.starts_with("`1.` **first**"));
        assert!(description.contains("Unknown"));
    }
}
