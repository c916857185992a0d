// File: zyra-core/src/services/music/session_queue.rs
//
// Per-session playback queue. `current` is the item being played (or about to
// be); `upcoming` is everything after it, numbered from 1 as shown by /queue.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use zyra_common::models::{MediaItem, NowPlayingPanel, PanelHandle, QueueSnapshot, RepeatMode, SessionId};
use zyra_common::traits::StatusNotifier;

use crate::Error;
use crate::services::music::registry::SessionRegistry;
use crate::tasks::panel_refresh;
use crate::utils::time::{format_duration, total_duration};
use crate::voice::{StreamPipeline, TransportEvent, VoiceTransport};

pub const MAX_VOLUME: i64 = 100;
pub const PANEL_PREVIEW_LEN: usize = 3;
pub const QUEUE_FINISHED_NOTICE: &str = "🎵 Queue finished. Add more songs to keep the party going!";

#[derive(Debug, Clone)]
pub struct QueueSettings {
    pub default_volume: u8,
    /// How long a dropped voice connection may take to come back.
    pub reconnect_window: Duration,
    pub panel_refresh_interval: Duration,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            default_volume: 50,
            reconnect_window: Duration::from_secs(5),
            panel_refresh_interval: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    current: Option<MediaItem>,
    upcoming: VecDeque<MediaItem>,
    volume: u8,
    playing: bool,
    paused: bool,
    repeat: RepeatMode,
    /// Track id of the attached stream; end events for other ids are stale.
    active_track: Option<Uuid>,
    /// Bumped whenever the item being opened stops being wanted.
    generation: u64,
    played: Duration,
    resumed_at: Option<Instant>,
    panel: Option<PanelHandle>,
    panel_refresh: Option<CancellationToken>,
    destroyed: bool,
}

impl QueueState {
    fn len(&self) -> usize {
        self.upcoming.len() + usize::from(self.current.is_some())
    }

    fn elapsed(&self) -> Duration {
        self.played + self.resumed_at.map(|t| t.elapsed()).unwrap_or_default()
    }

    /// Moves on from the current item according to the repeat mode. Returns
    /// false when nothing is left to play.
    fn advance(&mut self) -> bool {
        match self.repeat {
            RepeatMode::Single => {}
            RepeatMode::All => {
                if let Some(done) = self.current.take() {
                    self.upcoming.push_back(done);
                }
                self.current = self.upcoming.pop_front();
            }
            _ => {
                self.current = self.upcoming.pop_front();
            }
        }
        self.current.is_some()
    }

    fn check_position(&self, position: usize) -> Result<usize, Error> {
        if position == 0 || position > self.upcoming.len() {
            return Err(Error::OutOfRange(format!(
                "Invalid position! Queue has {} upcoming song(s).",
                self.upcoming.len()
            )));
        }
        Ok(position - 1)
    }

    fn panel_model(&self) -> Option<NowPlayingPanel> {
        let item = self.current.clone()?;
        Some(NowPlayingPanel {
            item,
            elapsed_secs: self.elapsed().as_secs(),
            volume: self.volume,
            repeat: self.repeat,
            paused: self.paused,
            queue_len: self.len(),
            preview: self.upcoming.iter().take(PANEL_PREVIEW_LEN).cloned().collect(),
        })
    }
}

fn linear_volume(volume: u8) -> f32 {
    f32::from(volume) / 100.0
}

pub struct SessionQueue {
    id: SessionId,
    state: Mutex<QueueState>,
    transport: Arc<dyn VoiceTransport>,
    pipeline: Arc<dyn StreamPipeline>,
    notifier: Arc<dyn StatusNotifier>,
    registry: Arc<SessionRegistry>,
    jobs: CancellationToken,
    settings: QueueSettings,
}

impl std::fmt::Debug for SessionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionQueue").field("id", &self.id).finish_non_exhaustive()
    }
}

impl SessionQueue {
    pub fn new(
        id: SessionId,
        transport: Arc<dyn VoiceTransport>,
        pipeline: Arc<dyn StreamPipeline>,
        notifier: Arc<dyn StatusNotifier>,
        registry: Arc<SessionRegistry>,
        settings: QueueSettings,
    ) -> Arc<Self> {
        let state = QueueState {
            volume: settings.default_volume.min(MAX_VOLUME as u8),
            ..QueueState::default()
        };
        Arc::new(Self {
            id,
            state: Mutex::new(state),
            transport,
            pipeline,
            notifier,
            registry,
            jobs: CancellationToken::new(),
            settings,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Parent token of every background job tied to this session.
    pub fn jobs(&self) -> &CancellationToken {
        &self.jobs
    }

    pub fn notifier(&self) -> &Arc<dyn StatusNotifier> {
        &self.notifier
    }

    pub fn is_destroyed(&self) -> bool {
        // Cancellation happens first thing in stop(), so the token doubles as
        // a lock-free destroyed flag.
        self.jobs.is_cancelled()
    }

    // ---------------------------------------------------------------
    // Queue mutation
    // ---------------------------------------------------------------

    /// Adds an item; it becomes current when nothing is. Returns its position
    /// (0 = current, otherwise 1-based over upcoming). Never starts playback.
    pub async fn enqueue(&self, item: MediaItem, position: Option<usize>) -> Result<usize, Error> {
        let mut st = self.state.lock().await;
        if st.destroyed {
            return Err(Error::InvalidState("This session has ended.".into()));
        }
        if st.current.is_none() {
            st.current = Some(item);
            return Ok(0);
        }
        let index = match position {
            Some(p) if p >= 1 && p <= st.upcoming.len() => p - 1,
            _ => st.upcoming.len(),
        };
        st.upcoming.insert(index, item);
        Ok(index + 1)
    }

    /// Appends all items in order. Returns the position of the first one.
    pub async fn enqueue_all(&self, items: Vec<MediaItem>) -> Result<usize, Error> {
        let mut st = self.state.lock().await;
        if st.destroyed {
            return Err(Error::InvalidState("This session has ended.".into()));
        }
        let mut items = items.into_iter();
        let first_position = if st.current.is_none() {
            st.current = items.next();
            0
        } else {
            st.upcoming.len() + 1
        };
        st.upcoming.extend(items);
        Ok(first_position)
    }

    pub async fn remove(&self, position: usize) -> Result<MediaItem, Error> {
        let mut st = self.state.lock().await;
        let index = st.check_position(position)?;
        st.upcoming
            .remove(index)
            .ok_or_else(|| Error::OutOfRange(format!("no song at position {position}")))
    }

    /// Moves the upcoming item at `from` so it ends up at `to`.
    pub async fn move_item(&self, from: usize, to: usize) -> Result<MediaItem, Error> {
        let mut st = self.state.lock().await;
        let from_index = st.check_position(from)?;
        let to_index = st.check_position(to)?;
        let item = st
            .upcoming
            .remove(from_index)
            .ok_or_else(|| Error::OutOfRange(format!("no song at position {from}")))?;
        st.upcoming.insert(to_index, item.clone());
        Ok(item)
    }

    /// Drops every upcoming item; the current one keeps playing.
    pub async fn clear(&self) -> usize {
        let mut st = self.state.lock().await;
        let cleared = st.upcoming.len();
        st.upcoming.clear();
        cleared
    }

    pub async fn shuffle(&self) -> Result<(), Error> {
        let mut st = self.state.lock().await;
        if st.len() < 3 {
            return Err(Error::InsufficientItems("Need at least 3 songs to shuffle!".into()));
        }
        st.upcoming.make_contiguous().shuffle(&mut rand::rng());
        Ok(())
    }

    pub async fn set_volume(&self, volume: i64) -> Result<u8, Error> {
        if !(0..=MAX_VOLUME).contains(&volume) {
            return Err(Error::OutOfRange("Volume must be between 0 and 100!".into()));
        }
        let volume = volume as u8;
        let mut st = self.state.lock().await;
        st.volume = volume;
        if st.active_track.is_some() {
            if let Err(e) = self.transport.set_volume(linear_volume(volume)).await {
                warn!("(SessionQueue) session {} failed to apply volume => {e}", self.id);
            }
        }
        Ok(volume)
    }

    pub async fn set_repeat_mode(&self, mode: RepeatMode) {
        self.state.lock().await.repeat = mode;
    }

    pub async fn cycle_repeat_mode(&self) -> RepeatMode {
        let mut st = self.state.lock().await;
        st.repeat = st.repeat.next();
        st.repeat
    }

    // ---------------------------------------------------------------
    // Playback control
    // ---------------------------------------------------------------

    pub async fn pause(&self) -> Result<(), Error> {
        let mut st = self.state.lock().await;
        if st.current.is_none() || !st.playing {
            return Err(Error::InvalidState("Nothing is playing right now.".into()));
        }
        if st.paused {
            return Err(Error::InvalidState("Music is already paused!".into()));
        }
        self.transport.pause().await?;
        st.paused = true;
        if let Some(since) = st.resumed_at.take() {
            st.played += since.elapsed();
        }
        Ok(())
    }

    pub async fn resume(&self) -> Result<(), Error> {
        let mut st = self.state.lock().await;
        if st.current.is_none() || !st.playing {
            return Err(Error::InvalidState("Nothing is playing right now.".into()));
        }
        if !st.paused {
            return Err(Error::InvalidState("Music is not paused!".into()));
        }
        self.transport.resume().await?;
        st.paused = false;
        st.resumed_at = Some(Instant::now());
        Ok(())
    }

    /// Returns the new paused flag.
    pub async fn toggle_pause(&self) -> Result<bool, Error> {
        if self.is_paused().await {
            self.resume().await.map(|_| false)
        } else {
            self.pause().await.map(|_| true)
        }
    }

    /// Starts playback when the queue has a current item but nothing is
    /// playing. Returns whether playback was started.
    pub async fn start_if_idle(self: &Arc<Self>) -> bool {
        {
            let mut st = self.state.lock().await;
            if st.destroyed || st.playing || st.current.is_none() {
                return false;
            }
            st.playing = true;
        }
        self.play().await;
        true
    }

    /// Plays `current`. Items whose stream cannot be opened are reported and
    /// dropped until one plays or the queue runs dry.
    pub async fn play(self: &Arc<Self>) {
        loop {
            let (item, generation) = {
                let mut st = self.state.lock().await;
                if st.destroyed {
                    return;
                }
                let Some(item) = st.current.clone() else {
                    drop(st);
                    self.stop().await;
                    return;
                };
                st.generation += 1;
                st.playing = true;
                st.paused = false;
                st.active_track = None;
                st.resumed_at = None;
                st.played = Duration::ZERO;
                (item, st.generation)
            };

            debug!("(SessionQueue) session {} opening '{}'", self.id, item.title);
            let failure = match self.pipeline.open_stream(&item.source_url).await {
                Ok(stream) => {
                    let mut st = self.state.lock().await;
                    if st.destroyed || st.generation != generation {
                        debug!("(SessionQueue) session {} discarding late stream for '{}'", self.id, item.title);
                        return;
                    }
                    match self.transport.attach(stream, linear_volume(st.volume)).await {
                        Ok(track_id) => {
                            st.active_track = Some(track_id);
                            st.resumed_at = Some(Instant::now());
                            let old_panel = st.panel.take();
                            let model = st.panel_model();
                            drop(st);
                            info!("(SessionQueue) session {} now playing '{}'", self.id, item.title);
                            self.replace_panel(old_panel, model, generation).await;
                            return;
                        }
                        Err(e) => e,
                    }
                }
                Err(e) => e,
            };

            warn!("(SessionQueue) session {} failed to play '{}' => {failure}", self.id, item.title);
            self.notice(&format!("❌ Error playing **{}**: {failure}", item.title)).await;

            let mut st = self.state.lock().await;
            if st.destroyed || st.generation != generation {
                return;
            }
            st.current = st.upcoming.pop_front();
            if st.current.is_none() {
                drop(st);
                self.notice(QUEUE_FINISHED_NOTICE).await;
                self.stop().await;
                return;
            }
        }
    }

    /// Natural end of the current item.
    pub async fn process_queue(self: &Arc<Self>) {
        let has_next = {
            let mut st = self.state.lock().await;
            if st.destroyed || !st.playing || st.active_track.is_none() {
                debug!("(SessionQueue) session {} ignoring completion, nothing active", self.id);
                return;
            }
            st.active_track = None;
            st.advance()
        };

        if has_next {
            self.play().await;
        } else {
            self.notice(QUEUE_FINISHED_NOTICE).await;
            self.stop().await;
        }
    }

    pub async fn on_track_end(self: &Arc<Self>, track_id: Uuid) {
        {
            let st = self.state.lock().await;
            if st.active_track != Some(track_id) {
                debug!("(SessionQueue) session {} ignoring end of stale track {track_id}", self.id);
                return;
            }
        }
        self.process_queue().await;
    }

    /// Ends the current item the way a natural end would, so `Single` replays
    /// it. The transport's end event advances the queue; with no attached
    /// track the queue advances right away.
    pub async fn skip(self: &Arc<Self>) -> Result<(), Error> {
        let has_next = {
            let mut st = self.state.lock().await;
            if st.destroyed || st.current.is_none() {
                return Err(Error::InvalidState("Nothing is playing right now.".into()));
            }
            if st.active_track.is_some() {
                None
            } else {
                st.generation += 1;
                Some(st.advance())
            }
        };

        match has_next {
            None => self.transport.stop_track().await,
            Some(true) => {
                self.play().await;
                Ok(())
            }
            Some(false) => {
                self.notice(QUEUE_FINISHED_NOTICE).await;
                self.stop().await;
                Ok(())
            }
        }
    }

    /// Jumps to the upcoming item at `position`, dropping everything before it.
    pub async fn skip_to(self: &Arc<Self>, position: usize) -> Result<MediaItem, Error> {
        let target = {
            let mut st = self.state.lock().await;
            let index = st.check_position(position)?;
            st.upcoming.drain(..index);
            st.upcoming
                .front()
                .cloned()
                .ok_or_else(|| Error::OutOfRange(format!("no song at position {position}")))?
        };
        self.skip().await?;
        Ok(target)
    }

    /// Tears the session down. Safe to call more than once.
    pub async fn stop(&self) {
        let (panel, refresh) = {
            let mut st = self.state.lock().await;
            if st.destroyed {
                return;
            }
            st.destroyed = true;
            st.current = None;
            st.upcoming.clear();
            st.playing = false;
            st.paused = false;
            st.active_track = None;
            st.resumed_at = None;
            st.generation += 1;
            (st.panel.take(), st.panel_refresh.take())
        };
        self.jobs.cancel();
        if let Some(token) = refresh {
            token.cancel();
        }

        if let Err(e) = self.transport.release().await {
            if !e.is_not_found() {
                warn!("(SessionQueue) session {} failed to release voice => {e}", self.id);
            }
        }
        if let Some(handle) = panel {
            self.delete_panel(&handle).await;
        }
        self.registry.remove_if_same(self.id, self);
        info!("(SessionQueue) session {} stopped", self.id);
    }

    /// Consumes transport events until the session ends.
    pub async fn run_event_loop(self: Arc<Self>, mut events: UnboundedReceiver<TransportEvent>) {
        let mut deferred: VecDeque<TransportEvent> = VecDeque::new();
        loop {
            let event = match deferred.pop_front() {
                Some(ev) => ev,
                None => tokio::select! {
                    _ = self.jobs.cancelled() => break,
                    ev = events.recv() => match ev {
                        Some(ev) => ev,
                        None => break,
                    },
                },
            };

            match event {
                TransportEvent::TrackEnded { track_id } => self.on_track_end(track_id).await,
                TransportEvent::TrackErrored { track_id, reason } => {
                    if self.is_active_track(track_id).await {
                        let title = self.current_item().await.map(|i| i.title).unwrap_or_default();
                        warn!("(SessionQueue) session {} track error on '{title}' => {reason}", self.id);
                        self.notice(&format!("❌ Error playing **{title}**: {reason}")).await;
                    }
                    self.on_track_end(track_id).await;
                }
                TransportEvent::Disconnected => {
                    warn!("(SessionQueue) session {} voice connection lost, waiting for reconnect", self.id);
                    if !self.await_reconnect(&mut events, &mut deferred).await {
                        error!("(SessionQueue) session {} could not reconnect => stopping", self.id);
                        self.stop().await;
                        break;
                    }
                    info!("(SessionQueue) session {} voice connection restored", self.id);
                }
                TransportEvent::Reconnected => {
                    debug!("(SessionQueue) session {} reconnected", self.id);
                }
            }
        }
        debug!("(SessionQueue) session {} event loop finished", self.id);
    }

    /// Waits for `Reconnected` within the reconnect window. Other events seen
    /// meanwhile are kept for later.
    async fn await_reconnect(
        &self,
        events: &mut UnboundedReceiver<TransportEvent>,
        deferred: &mut VecDeque<TransportEvent>,
    ) -> bool {
        let wait = async {
            loop {
                match events.recv().await {
                    Some(TransportEvent::Reconnected) => return true,
                    Some(TransportEvent::Disconnected) => {}
                    Some(other) => deferred.push_back(other),
                    None => return false,
                }
            }
        };
        tokio::select! {
            _ = self.jobs.cancelled() => false,
            res = tokio::time::timeout(self.settings.reconnect_window, wait) => res.unwrap_or(false),
        }
    }

    // ---------------------------------------------------------------
    // Panel
    // ---------------------------------------------------------------

    async fn replace_panel(self: &Arc<Self>, old: Option<PanelHandle>, model: Option<NowPlayingPanel>, generation: u64) {
        let posted = match model {
            Some(model) => match self.notifier.post_panel(&model).await {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!("(SessionQueue) session {} failed to post panel => {e}", self.id);
                    None
                }
            },
            None => None,
        };
        if let Some(old) = old {
            self.delete_panel(&old).await;
        }
        let Some(handle) = posted else { return };

        let mut st = self.state.lock().await;
        if st.destroyed || st.generation != generation {
            drop(st);
            self.delete_panel(&handle).await;
            return;
        }
        if let Some(previous) = st.panel.replace(handle) {
            drop(st);
            self.delete_panel(&previous).await;
            st = self.state.lock().await;
        }
        if let Some(token) = st.panel_refresh.take() {
            token.cancel();
        }
        let token = self.jobs.child_token();
        st.panel_refresh = Some(token.clone());
        drop(st);
        panel_refresh::spawn_panel_refresh(self.clone(), token, self.settings.panel_refresh_interval);
    }

    async fn delete_panel(&self, handle: &PanelHandle) {
        if let Err(e) = self.notifier.delete_panel(handle).await {
            if !e.is_not_found() {
                warn!("(SessionQueue) session {} failed to delete panel => {e}", self.id);
            }
        }
    }

    /// Re-renders the posted panel. Returns false when there is nothing left
    /// to refresh.
    pub async fn refresh_panel(&self) -> bool {
        let (handle, model) = {
            let st = self.state.lock().await;
            match (st.panel, st.panel_model()) {
                (Some(handle), Some(model)) if !st.destroyed => (handle, model),
                _ => return false,
            }
        };
        match self.notifier.update_panel(&handle, &model).await {
            Ok(()) => true,
            Err(e) if e.is_not_found() => {
                let mut st = self.state.lock().await;
                if st.panel == Some(handle) {
                    st.panel = None;
                }
                false
            }
            Err(e) => {
                warn!("(SessionQueue) session {} failed to refresh panel => {e}", self.id);
                true
            }
        }
    }

    async fn notice(&self, content: &str) {
        if let Err(e) = self.notifier.send_notice(content).await {
            warn!("(SessionQueue) session {} notice failed => {e}", self.id);
        }
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    pub async fn current_item(&self) -> Option<MediaItem> {
        self.state.lock().await.current.clone()
    }

    pub async fn upcoming_items(&self) -> Vec<MediaItem> {
        self.state.lock().await.upcoming.iter().cloned().collect()
    }

    /// Current plus upcoming.
    pub async fn len(&self) -> usize {
        self.state.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_idle(&self) -> bool {
        !self.state.lock().await.playing
    }

    pub async fn is_paused(&self) -> bool {
        self.state.lock().await.paused
    }

    pub async fn volume(&self) -> u8 {
        self.state.lock().await.volume
    }

    pub async fn repeat_mode(&self) -> RepeatMode {
        self.state.lock().await.repeat
    }

    pub async fn panel(&self) -> Option<PanelHandle> {
        self.state.lock().await.panel
    }

    pub async fn now_playing(&self) -> Option<NowPlayingPanel> {
        self.state.lock().await.panel_model()
    }

    async fn is_active_track(&self, track_id: Uuid) -> bool {
        self.state.lock().await.active_track == Some(track_id)
    }

    pub async fn formatted_total_duration(&self) -> String {
        let st = self.state.lock().await;
        format_duration(total_duration(st.current.iter().chain(st.upcoming.iter())))
    }

    pub async fn snapshot(&self) -> QueueSnapshot {
        let st = self.state.lock().await;
        QueueSnapshot {
            session_id: self.id,
            current: st.current.clone(),
            upcoming: st.upcoming.iter().cloned().collect(),
            volume: st.volume,
            playing: st.playing,
            paused: st.paused,
            repeat: st.repeat,
            elapsed_secs: st.elapsed().as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zyra_common::models::{CatalogOrigin, Requester};

    fn item(title: &str) -> MediaItem {
        MediaItem {
            title: title.into(),
            source_url: format!("https://youtu.be/{title}"),
            duration_secs: 60,
            thumbnail_url: None,
            uploader: "up".into(),
            requested_by: Requester::new(1, "u"),
            origin: CatalogOrigin::Primary,
            cross_ref: None,
        }
    }

    fn state(current: &str, upcoming: &[&str], repeat: RepeatMode) -> QueueState {
        QueueState {
            current: Some(item(current)),
            upcoming: upcoming.iter().map(|t| item(t)).collect(),
            repeat,
            ..QueueState::default()
        }
    }

    fn titles(st: &QueueState) -> Vec<String> {
        st.current.iter().chain(st.upcoming.iter()).map(|i| i.title.clone()).collect()
    }

    #[test]
    fn advance_follows_repeat_mode() {
        let mut st = state("A", &["B"], RepeatMode::Off);
        assert!(st.advance());
        assert_eq!(titles(&st), vec!["B"]);
        assert!(!st.advance());

        let mut st = state("A", &["B"], RepeatMode::All);
        assert!(st.advance());
        assert_eq!(titles(&st), vec!["B", "A"]);

        let mut st = state("A", &["B"], RepeatMode::Single);
        assert!(st.advance());
        assert_eq!(titles(&st), vec!["A", "B"]);
    }

    #[test]
    fn positions_are_one_based_over_upcoming() {
        let st = state("A", &["B", "C"], RepeatMode::Off);
        assert!(st.check_position(0).is_err());
        assert_eq!(st.check_position(1).unwrap(), 0);
        assert_eq!(st.check_position(2).unwrap(), 1);
        assert!(matches!(st.check_position(3), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn panel_preview_is_capped() {
        let st = state("A", &["B", "C", "D", "E"], RepeatMode::Off);
        let panel = st.panel_model().unwrap();
        assert_eq!(panel.queue_len, 5);
        assert_eq!(panel.preview.len(), PANEL_PREVIEW_LEN);
        assert_eq!(panel.item.title, "A");
    }
}
