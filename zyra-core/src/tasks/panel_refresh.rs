// zyra-core/src/tasks/panel_refresh.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::services::music::session_queue::SessionQueue;

/// Spawns a task that keeps the session's now-playing panel current. Ends when
/// `token` is cancelled or the panel is gone.
pub fn spawn_panel_refresh(
    queue: Arc<SessionQueue>,
    token: CancellationToken,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the panel was just posted.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if !queue.refresh_panel().await {
                        break;
                    }
                }
            }
        }
        debug!("(PanelRefresh) session {} refresh loop ended", queue.id());
    })
}
