// File: zyra-core/src/matching/resolver.rs

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use zyra_common::models::{CatalogOrigin, MediaItem, Requester, TrackRecord};
use zyra_common::traits::PrimaryCatalog;

use crate::matching::scorer::{select_best, MatchTarget, ScoredCandidate};

static PARENTHESIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").expect("static regex"));
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").expect("static regex"));
static REMASTER_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*-\s*remaster.*$").expect("static regex"));
static YEAR_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*\d{4}.*$").expect("static regex"));

/// Suffixes tried with the cleaned title, most specific first.
const CLEAN_QUALIFIERS: [&str; 3] = ["official audio", "official video", "official"];
/// Suffixes tried with the full title.
const FULL_QUALIFIERS: [&str; 2] = ["lyrics", "music video"];

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Minimum total score a candidate must exceed.
    pub threshold: f64,
    pub inter_query_delay: Duration,
    pub search_timeout: Duration,
    /// Result count for the most specific queries.
    pub wide_limit: usize,
    pub narrow_limit: usize,
    /// How many of the leading queries use `wide_limit`.
    pub wide_queries: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            threshold: 0.35,
            inter_query_delay: Duration::from_millis(100),
            search_timeout: Duration::from_secs(10),
            wide_limit: 10,
            narrow_limit: 8,
            wide_queries: 4,
        }
    }
}

/// Strips `(feat. ...)`, `[Live]`, `- Remastered 2011`, `- 2003 Mix` style noise.
pub fn clean_title(title: &str) -> String {
    let s = PARENTHESIZED.replace_all(title, "");
    let s = BRACKETED.replace_all(&s, "");
    let s = REMASTER_SUFFIX.replace(&s, "");
    let s = YEAR_SUFFIX.replace(&s, "");
    s.trim().to_string()
}

fn squash(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|p| p.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Search strings from most to least specific, without blanks or repeats.
pub fn build_queries(track: &TrackRecord) -> Vec<String> {
    let title = track.title.trim();
    let cleaned = clean_title(title);
    let primary = track.primary_artist();
    let all_artists = track.joined_artists(" ");
    let first_word = title.split(' ').next().unwrap_or("");

    let mut raw: Vec<String> = Vec::new();
    for q in CLEAN_QUALIFIERS {
        raw.push(squash(&[&cleaned, primary, q]));
    }
    for q in FULL_QUALIFIERS {
        raw.push(squash(&[title, primary, q]));
    }
    raw.push(squash(&[title, &all_artists]));
    raw.push(squash(&[title, primary]));
    raw.push(squash(&[&cleaned, primary]));
    raw.push(squash(&[first_word, primary]));
    raw.push(squash(&[primary, title]));
    raw.push(squash(&[title]));
    raw.push(squash(&[primary]));

    let mut queries: Vec<String> = Vec::with_capacity(raw.len());
    for q in raw {
        if !q.is_empty() && !queries.contains(&q) {
            queries.push(q);
        }
    }
    queries
}

/// Translates metadata-only tracks into playable primary-catalog items.
pub struct CatalogResolver {
    primary: Arc<dyn PrimaryCatalog>,
    config: ResolverConfig,
}

impl CatalogResolver {
    pub fn new(primary: Arc<dyn PrimaryCatalog>, config: ResolverConfig) -> Self {
        Self { primary, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Walks the query list until one produces an acceptable candidate.
    /// Individual query failures only move on to the next query.
    pub async fn resolve_best_match(&self, target: &TrackRecord, requester: &Requester) -> Option<MediaItem> {
        let queries = build_queries(target);
        let match_target = MatchTarget {
            title: &target.title,
            artists: &target.artists,
            duration_secs: target.duration_secs(),
        };

        for (i, query) in queries.iter().enumerate() {
            if i > 0 && !self.config.inter_query_delay.is_zero() {
                tokio::time::sleep(self.config.inter_query_delay).await;
            }

            let limit = if i < self.config.wide_queries {
                self.config.wide_limit
            } else {
                self.config.narrow_limit
            };

            let results = match tokio::time::timeout(
                self.config.search_timeout,
                self.primary.search(query, limit),
            )
            .await
            {
                Ok(Ok(results)) => results,
                Ok(Err(e)) => {
                    warn!("(CatalogResolver) query #{i} '{query}' failed => {e}");
                    continue;
                }
                Err(_) => {
                    warn!("(CatalogResolver) query #{i} '{query}' timed out");
                    continue;
                }
            };

            if results.is_empty() {
                debug!("(CatalogResolver) query #{i} '{query}' => no results");
                continue;
            }

            if let Some(best) = select_best(&results, &match_target, self.config.threshold) {
                info!(
                    "(CatalogResolver) '{}' matched '{}' via query #{i} (score={:.3})",
                    target.title, best.candidate.title, best.score.total
                );
                return Some(into_media_item(best, target, requester));
            }
            debug!("(CatalogResolver) query #{i} '{query}' => nothing above threshold");
        }

        info!(
            "(CatalogResolver) no acceptable match for '{}' by '{}' after {} queries",
            target.title,
            target.primary_artist(),
            queries.len()
        );
        None
    }
}

fn into_media_item(best: ScoredCandidate, target: &TrackRecord, requester: &Requester) -> MediaItem {
    let ScoredCandidate {
        candidate,
        duration_secs,
        ..
    } = best;
    MediaItem {
        title: candidate.title,
        source_url: candidate.url,
        duration_secs,
        thumbnail_url: candidate.thumbnail_url.or_else(|| target.album_art.clone()),
        uploader: target.joined_artists(", "),
        requested_by: requester.clone(),
        origin: CatalogOrigin::Secondary,
        cross_ref: Some(target.id.clone()),
    }
}
