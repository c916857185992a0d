// File: zyra-core/src/platforms/discord/notifier.rs

use std::sync::Arc;

use async_trait::async_trait;
use twilight_http::Client as HttpClient;
use twilight_http::error::{Error as TwilightHttpError, ErrorType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};

use zyra_common::models::{NowPlayingPanel, PanelHandle};
use zyra_common::traits::StatusNotifier;

use crate::Error;
use crate::platforms::discord::panel::{panel_components, panel_embed};

/// 404 from Discord means the message or channel is gone.
pub fn map_http_error(context: &str, e: TwilightHttpError) -> Error {
    if let ErrorType::Response { status, .. } = e.kind() {
        if status.get() == 404 {
            return Error::NotFound(format!("{context}: {e}"));
        }
    }
    Error::Platform(format!("{context}: {e}"))
}

/// Posts notices and the now-playing panel into one text channel.
pub struct ChannelNotifier {
    http: Arc<HttpClient>,
    channel_id: Id<ChannelMarker>,
}

impl ChannelNotifier {
    pub fn new(http: Arc<HttpClient>, channel_id: Id<ChannelMarker>) -> Self {
        Self { http, channel_id }
    }

    fn ids(&self, handle: &PanelHandle) -> Result<(Id<ChannelMarker>, Id<MessageMarker>), Error> {
        let channel = Id::new_checked(handle.channel_id)
            .ok_or_else(|| Error::NotFound("panel has no channel".into()))?;
        let message = Id::new_checked(handle.message_id)
            .ok_or_else(|| Error::NotFound("panel has no message".into()))?;
        Ok((channel, message))
    }
}

#[async_trait]
impl StatusNotifier for ChannelNotifier {
    async fn send_notice(&self, content: &str) -> Result<(), Error> {
        self.http
            .create_message(self.channel_id)
            .content(content)
            .await
            .map_err(|e| map_http_error("Error sending notice", e))?;
        Ok(())
    }

    async fn post_panel(&self, panel: &NowPlayingPanel) -> Result<PanelHandle, Error> {
        let embeds = [panel_embed(panel)];
        let components = panel_components(panel);
        let message = self
            .http
            .create_message(self.channel_id)
            .embeds(&embeds)
            .components(&components)
            .await
            .map_err(|e| map_http_error("Error posting panel", e))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error reading posted panel: {e}")))?;
        Ok(PanelHandle {
            channel_id: message.channel_id.get(),
            message_id: message.id.get(),
        })
    }

    async fn update_panel(&self, handle: &PanelHandle, panel: &NowPlayingPanel) -> Result<(), Error> {
        let (channel, message) = self.ids(handle)?;
        let embeds = [panel_embed(panel)];
        let components = panel_components(panel);
        self.http
            .update_message(channel, message)
            .embeds(Some(&embeds[..]))
            .components(Some(components.as_slice()))
            .await
            .map_err(|e| map_http_error("Error updating panel", e))?;
        Ok(())
    }

    async fn delete_panel(&self, handle: &PanelHandle) -> Result<(), Error> {
        let (channel, message) = self.ids(handle)?;
        self.http
            .delete_message(channel, message)
            .await
            .map_err(|e| map_http_error("Error deleting panel", e))?;
        Ok(())
    }
}
