use async_trait::async_trait;

use crate::error::Error;
use crate::models::{NowPlayingPanel, PanelHandle};

/// The text channel a session reports to. All calls are best-effort from the
/// queue's point of view: failures are logged, never fatal.
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    async fn send_notice(&self, content: &str) -> Result<(), Error>;

    async fn post_panel(&self, panel: &NowPlayingPanel) -> Result<PanelHandle, Error>;

    async fn update_panel(&self, handle: &PanelHandle, panel: &NowPlayingPanel) -> Result<(), Error>;

    /// Must return `Error::NotFound` when the panel is already gone.
    async fn delete_panel(&self, handle: &PanelHandle) -> Result<(), Error>;
}
