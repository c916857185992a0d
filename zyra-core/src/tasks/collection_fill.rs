// zyra-core/src/tasks/collection_fill.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use zyra_common::models::{Requester, TrackRecord};

use crate::matching::CatalogResolver;
use crate::services::music::registry::SessionRegistry;
use crate::services::music::session_queue::SessionQueue;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FillSummary {
    pub added: usize,
    pub unmatched: usize,
    /// The session ended before every member was processed.
    pub interrupted: bool,
}

/// Resolves the remaining members of a collection one by one and appends
/// them to `queue`. Stops as soon as the session is torn down or replaced.
pub async fn fill_collection(
    queue: Arc<SessionQueue>,
    registry: Arc<SessionRegistry>,
    resolver: Arc<CatalogResolver>,
    pending: Vec<TrackRecord>,
    requester: Requester,
    delay: Duration,
) -> FillSummary {
    let token = queue.jobs().child_token();
    let mut summary = FillSummary::default();
    let total = pending.len();

    for (i, record) in pending.into_iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = sleep(delay) => {}
            }
        }
        if token.is_cancelled() || !registry.is_live(queue.id(), &queue) {
            summary.interrupted = true;
            break;
        }

        let matched = tokio::select! {
            _ = token.cancelled() => {
                summary.interrupted = true;
                break;
            }
            m = resolver.resolve_best_match(&record, &requester) => m,
        };

        let Some(item) = matched else {
            debug!("(CollectionFill) no match for '{}'", record.title);
            summary.unmatched += 1;
            continue;
        };

        if !registry.is_live(queue.id(), &queue) {
            summary.interrupted = true;
            break;
        }
        if let Err(e) = queue.enqueue(item, None).await {
            warn!("(CollectionFill) session {} rejected item => {e}", queue.id());
            summary.interrupted = true;
            break;
        }
        summary.added += 1;
        queue.start_if_idle().await;
    }

    info!(
        "(CollectionFill) session {} => {}/{} added, {} unmatched{}",
        queue.id(),
        summary.added,
        total,
        summary.unmatched,
        if summary.interrupted { " (interrupted)" } else { "" }
    );
    summary
}

/// Spawns [`fill_collection`] and posts a summary to the session's text
/// channel when it finishes.
pub fn spawn_collection_fill(
    queue: Arc<SessionQueue>,
    registry: Arc<SessionRegistry>,
    resolver: Arc<CatalogResolver>,
    pending: Vec<TrackRecord>,
    requester: Requester,
    title: String,
    delay: Duration,
) -> JoinHandle<FillSummary> {
    tokio::spawn(async move {
        let notifier = queue.notifier().clone();
        let summary = fill_collection(queue.clone(), registry.clone(), resolver, pending, requester, delay).await;

        if !summary.interrupted && registry.is_live(queue.id(), &queue) {
            let mut msg = format!("✅ Finished loading **{title}**: added {} more song(s)", summary.added);
            if summary.unmatched > 0 {
                msg.push_str(&format!(", {} could not be found on YouTube", summary.unmatched));
            }
            if let Err(e) = notifier.send_notice(&msg).await {
                warn!("(CollectionFill) summary notice failed => {e}");
            }
        }
        summary
    })
}
