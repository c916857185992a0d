//! Weighted similarity between a primary-catalog candidate and a
//! secondary-catalog track.
//!
//! Four independent sub-scores feed the total:
//!
//! | sub-score | weight |
//! |-----------|--------|
//! | title     | 0.50   |
//! | artist    | 0.35   |
//! | duration  | 0.10   |
//! | channel   | 0.05   |

use std::collections::HashSet;

use zyra_common::models::VideoCandidate;

pub const TITLE_WEIGHT: f64 = 0.50;
pub const ARTIST_WEIGHT: f64 = 0.35;
pub const DURATION_WEIGHT: f64 = 0.10;
pub const CHANNEL_WEIGHT: f64 = 0.05;

/// Shortest and longest candidate (in seconds) worth considering.
pub const MIN_CANDIDATE_SECS: u64 = 10;
pub const MAX_CANDIDATE_SECS: u64 = 1200;

/// Raw durations above this are assumed to be milliseconds.
const MILLIS_HEURISTIC: u64 = 10_000;

const CREDIBLE_CHANNEL_MARKERS: [&str; 4] = ["official", "vevo", "records", "music"];
const MAJOR_LABELS: [&str; 6] = ["warner", "sony", "universal", "atlantic", "columbia", "emi"];

/// What a candidate is scored against.
#[derive(Debug, Clone, Copy)]
pub struct MatchTarget<'a> {
    pub title: &'a str,
    /// Primary artist first.
    pub artists: &'a [String],
    /// 0 means unknown.
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore {
    pub title: f64,
    pub artist: f64,
    pub duration: f64,
    pub channel: f64,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: VideoCandidate,
    pub score: MatchScore,
    /// Duration after millisecond correction.
    pub duration_secs: u64,
}

fn normalize(s: &str) -> String {
    let lowered = s.to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c.is_whitespace() { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn title_similarity(candidate_title: &str, target_title: &str) -> f64 {
    let cand = normalize(candidate_title);
    let target = normalize(target_title);

    // An empty side would "contain" anything.
    if !cand.is_empty() && !target.is_empty() && (cand.contains(&target) || target.contains(&cand)) {
        return 1.0;
    }

    let cand_words: HashSet<&str> = cand.split(' ').filter(|w| !w.is_empty()).collect();
    let target_words: HashSet<&str> = target.split(' ').filter(|w| !w.is_empty()).collect();

    let intersection = cand_words.intersection(&target_words).count();
    let union = cand_words.union(&target_words).count();
    let jaccard = if union > 0 { intersection as f64 / union as f64 } else { 0.0 };

    let partial_matches = target_words
        .iter()
        .filter(|tw| {
            cand_words.iter().any(|cw| {
                if tw.chars().count() > 2 {
                    cw.contains(*tw)
                } else {
                    cw == *tw
                }
            })
        })
        .count();
    let partial = if target_words.is_empty() {
        0.0
    } else {
        partial_matches as f64 / target_words.len() as f64
    };

    jaccard.max(partial * 0.9)
}

pub fn artist_similarity(candidate_title: &str, artists: &[String]) -> f64 {
    let title = candidate_title.to_lowercase();
    let lowered: Vec<String> = artists.iter().map(|a| a.to_lowercase()).collect();
    // (token, belongs to the first-listed artist)
    let tokens: Vec<(&str, bool)> = lowered
        .iter()
        .enumerate()
        .flat_map(|(i, artist)| {
            artist
                .split(|c: char| c == ',' || c == '&' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(move |t| (t, i == 0))
        })
        .collect();
    if tokens.is_empty() {
        return 0.0;
    }

    let mut score = 0.0;
    for (token, primary) in &tokens {
        if title.contains(token) {
            score += if *primary { 1.0 } else { 0.8 };
        } else if token.chars().count() > 2 {
            // "jay-z", "p!nk": credit the pieces.
            let parts: Vec<&str> = token
                .split(|c: char| !c.is_alphanumeric())
                .filter(|p| !p.is_empty())
                .collect();
            if parts.is_empty() {
                continue;
            }
            let found = parts
                .iter()
                .filter(|p| p.chars().count() > 1 && title.contains(*p))
                .count();
            if found > 0 {
                score += (found as f64 / parts.len() as f64) * 0.7;
            }
        }
    }

    (score / tokens.len() as f64).min(1.0)
}

pub fn duration_similarity(candidate_secs: u64, target_secs: u64) -> f64 {
    if candidate_secs == 0 || target_secs == 0 {
        return 0.5;
    }
    let diff = candidate_secs.abs_diff(target_secs) as f64;
    let tolerance = (candidate_secs + target_secs) as f64 / 2.0 * 0.30;

    if diff == 0.0 {
        1.0
    } else if diff <= 10.0 {
        0.9
    } else if diff <= 30.0 {
        0.8
    } else if diff <= tolerance {
        (1.0 - (diff / tolerance) * 0.4).max(0.5)
    } else {
        0.3
    }
}

pub fn channel_score(uploader: &str) -> f64 {
    if uploader.is_empty() {
        return 0.0;
    }
    let channel = uploader.to_lowercase();
    if CREDIBLE_CHANNEL_MARKERS.iter().any(|m| channel.contains(m)) {
        return 1.0;
    }
    // Auto-generated artist channels.
    if channel.contains(" - topic") {
        return 0.9;
    }
    if MAJOR_LABELS.iter().any(|l| channel.contains(l)) {
        return 0.8;
    }
    0.3
}

/// Millisecond correction plus the plausible-length window.
/// `None` means the candidate must not be scored at all.
pub fn eligible_duration(raw: Option<u64>) -> Option<u64> {
    let raw = raw.filter(|d| *d > 0)?;
    let secs = if raw > MILLIS_HEURISTIC { raw / 1000 } else { raw };
    (MIN_CANDIDATE_SECS..=MAX_CANDIDATE_SECS)
        .contains(&secs)
        .then_some(secs)
}

pub fn score(candidate: &VideoCandidate, duration_secs: u64, target: &MatchTarget<'_>) -> MatchScore {
    let title = title_similarity(&candidate.title, target.title);
    let artist = artist_similarity(&candidate.title, target.artists);
    let duration = duration_similarity(duration_secs, target.duration_secs);
    let channel = channel_score(candidate.uploader.as_deref().unwrap_or(""));
    let total = title * TITLE_WEIGHT
        + artist * ARTIST_WEIGHT
        + duration * DURATION_WEIGHT
        + channel * CHANNEL_WEIGHT;
    MatchScore {
        title,
        artist,
        duration,
        channel,
        total,
    }
}

/// Highest-scoring eligible candidate strictly above `threshold`; the earlier
/// candidate wins a tie.
pub fn select_best(
    candidates: &[VideoCandidate],
    target: &MatchTarget<'_>,
    threshold: f64,
) -> Option<ScoredCandidate> {
    let mut best: Option<ScoredCandidate> = None;
    for candidate in candidates {
        if candidate.title.is_empty() {
            continue;
        }
        let Some(duration_secs) = eligible_duration(candidate.duration_secs) else {
            continue;
        };
        let s = score(candidate, duration_secs, target);
        let beats_best = best.as_ref().is_none_or(|b| s.total > b.score.total);
        if s.total > threshold && beats_best {
            best = Some(ScoredCandidate {
                candidate: candidate.clone(),
                score: s,
                duration_secs,
            });
        }
    }
    best
}
