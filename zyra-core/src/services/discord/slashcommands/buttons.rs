// File: zyra-core/src/services/discord/slashcommands/buttons.rs
//
// Now-playing panel controls. State-changing buttons redraw the panel they
// were pressed on; the rest answer privately.

use std::sync::Arc;

use tracing::debug;

use crate::Error;
use crate::platforms::discord::panel::{buttons, info_embed, panel_components, panel_embed, queue_embed, success_embed};
use crate::services::discord::DiscordContext;
use crate::services::discord::slashcommands::invocation::{require_control, require_session, Invocation};
use crate::services::discord::slashcommands::reply::Reply;
use crate::services::music::SessionQueue;

pub const VOLUME_STEP: i64 = 10;

/// The panel as it is now, replacing the message the button sits on.
async fn redraw(queue: &Arc<SessionQueue>) -> Reply {
    match queue.now_playing().await {
        Some(panel) => Reply::embed(panel_embed(&panel))
            .with_components(panel_components(&panel))
            .updating_source(),
        None => Reply::ephemeral(info_embed("Nothing is playing right now.")),
    }
}

pub async fn handle_button(ctx: &DiscordContext, inv: &Invocation, custom_id: &str) -> Result<Reply, Error> {
    debug!("(PanelButtons) {} pressed '{custom_id}' in {}", inv.display_name, inv.session);
    match custom_id {
        buttons::PAUSE => {
            let queue = require_control(ctx, inv)?;
            queue.toggle_pause().await?;
            Ok(redraw(&queue).await)
        }
        buttons::LOOP => {
            let queue = require_control(ctx, inv)?;
            queue.cycle_repeat_mode().await;
            Ok(redraw(&queue).await)
        }
        buttons::VOLUME_DOWN | buttons::VOLUME_UP => {
            let queue = require_control(ctx, inv)?;
            let step = if custom_id == buttons::VOLUME_UP { VOLUME_STEP } else { -VOLUME_STEP };
            let target = (i64::from(queue.volume().await) + step).clamp(0, 100);
            queue.set_volume(target).await?;
            Ok(redraw(&queue).await)
        }
        buttons::SHUFFLE => {
            let queue = require_control(ctx, inv)?;
            queue.shuffle().await?;
            Ok(redraw(&queue).await)
        }
        buttons::REFRESH => {
            let queue = require_session(ctx, inv)?;
            Ok(redraw(&queue).await)
        }
        buttons::SKIP => {
            let queue = require_control(ctx, inv)?;
            let title = queue.current_item().await.map(|i| i.title).unwrap_or_default();
            queue.skip().await?;
            Ok(Reply::ephemeral(success_embed(&format!("Skipped **{title}**"))))
        }
        buttons::STOP => {
            require_control(ctx, inv)?;
            ctx.music.disconnect(inv.session).await?;
            Ok(Reply::ephemeral(success_embed(
                "⏹️ Stopped the music and left the voice channel.",
            )))
        }
        buttons::QUEUE => {
            let queue = require_session(ctx, inv)?;
            Ok(Reply::ephemeral(queue_embed(&queue.snapshot().await, 0)))
        }
        buttons::PREVIOUS => Ok(Reply::ephemeral(info_embed(
            "Going back to the previous song is not supported.",
        ))),
        other => Err(Error::Parse(format!("Unknown control '{other}'"))),
    }
}
