// File: zyra-core/tests/test_utils/mod.rs
//
// Fakes for the voice, stream and notifier seams, plus mockall catalogs.
#![allow(dead_code)]

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use zyra_common::models::{
    CatalogOrigin, MediaItem, NowPlayingPanel, PanelHandle, PlaylistPage, Requester, SessionId, TrackCollection,
    TrackRecord, VideoCandidate,
};
use zyra_common::traits::{PrimaryCatalog, SecondaryCatalog, StatusNotifier};
use zyra_core::Error;
use zyra_core::services::music::{QueueSettings, SessionQueue, SessionRegistry};
use zyra_core::voice::{AudioStream, StreamPipeline, TransportEvent, VoiceGateway, VoiceTransport};

// ---------------------------------------------------------------
// Model helpers
// ---------------------------------------------------------------

pub fn requester() -> Requester {
    Requester::new(42, "tester")
}

pub fn item(title: &str, duration_secs: u64) -> MediaItem {
    MediaItem {
        title: title.to_string(),
        source_url: format!("https://www.youtube.com/watch?v={title}"),
        duration_secs,
        thumbnail_url: None,
        uploader: "Uploader".to_string(),
        requested_by: requester(),
        origin: CatalogOrigin::Primary,
        cross_ref: None,
    }
}

pub fn track(id: &str, title: &str, artist: &str, duration_ms: u64) -> TrackRecord {
    TrackRecord {
        id: id.to_string(),
        title: title.to_string(),
        artists: vec![artist.to_string()],
        duration_ms,
        url: Some(format!("https://open.spotify.com/track/{id}")),
        album_art: None,
    }
}

pub fn candidate(title: &str, url: &str, duration_secs: u64, uploader: &str) -> VideoCandidate {
    VideoCandidate {
        title: title.to_string(),
        url: url.to_string(),
        duration_secs: Some(duration_secs),
        uploader: Some(uploader.to_string()),
        thumbnail_url: None,
    }
}

/// Polls `check` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..400 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

// ---------------------------------------------------------------
// Stream pipeline
// ---------------------------------------------------------------

#[derive(Default)]
pub struct FakePipeline {
    failing: Mutex<HashSet<String>>,
    pub opened: Mutex<Vec<String>>,
}

impl FakePipeline {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_on(&self, locator: &str) {
        self.failing.lock().unwrap().insert(locator.to_string());
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl StreamPipeline for FakePipeline {
    async fn open_stream(&self, locator: &str) -> Result<AudioStream, Error> {
        self.opened.lock().unwrap().push(locator.to_string());
        if self.failing.lock().unwrap().contains(locator) {
            return Err(Error::UpstreamFailure("Video unavailable".into()));
        }
        // Lazy input: nothing is read until a driver plays it.
        let input = songbird::input::File::new("/dev/null").into();
        Ok(AudioStream::new(locator, input))
    }
}

// ---------------------------------------------------------------
// Voice transport
// ---------------------------------------------------------------

pub struct FakeTransport {
    events: UnboundedSender<TransportEvent>,
    pub attached: Mutex<Vec<(String, Uuid)>>,
    current: Mutex<Option<Uuid>>,
    pub volumes: Mutex<Vec<f32>>,
    pub paused: AtomicBool,
    pub released: AtomicUsize,
}

impl FakeTransport {
    pub fn new(events: UnboundedSender<TransportEvent>) -> Arc<Self> {
        Arc::new(Self {
            events,
            attached: Mutex::new(Vec::new()),
            current: Mutex::new(None),
            volumes: Mutex::new(Vec::new()),
            paused: AtomicBool::new(false),
            released: AtomicUsize::new(0),
        })
    }

    pub fn attached_locators(&self) -> Vec<String> {
        self.attached.lock().unwrap().iter().map(|(l, _)| l.clone()).collect()
    }

    pub fn current_track(&self) -> Option<Uuid> {
        *self.current.lock().unwrap()
    }

    /// The current track plays to its end.
    pub fn finish_current(&self) -> Option<Uuid> {
        let id = self.current.lock().unwrap().take()?;
        let _ = self.events.send(TransportEvent::TrackEnded { track_id: id });
        Some(id)
    }

    pub fn emit(&self, event: TransportEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl VoiceTransport for FakeTransport {
    async fn attach(&self, stream: AudioStream, volume: f32) -> Result<Uuid, Error> {
        let id = Uuid::new_v4();
        self.attached.lock().unwrap().push((stream.locator, id));
        self.volumes.lock().unwrap().push(volume);
        *self.current.lock().unwrap() = Some(id);
        Ok(id)
    }

    async fn pause(&self) -> Result<(), Error> {
        self.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&self) -> Result<(), Error> {
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_track(&self) -> Result<(), Error> {
        self.finish_current();
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> Result<(), Error> {
        self.volumes.lock().unwrap().push(volume);
        Ok(())
    }

    async fn release(&self) -> Result<(), Error> {
        if self.released.fetch_add(1, Ordering::SeqCst) > 0 {
            return Err(Error::NotFound("voice connection already released".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeGateway {
    pub joins: AtomicUsize,
    pub fail: AtomicBool,
    pub transports: Mutex<Vec<Arc<FakeTransport>>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn last_transport(&self) -> Option<Arc<FakeTransport>> {
        self.transports.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl VoiceGateway for FakeGateway {
    async fn join(
        &self,
        _session: SessionId,
        _channel_id: u64,
        events: UnboundedSender<TransportEvent>,
    ) -> Result<Arc<dyn VoiceTransport>, Error> {
        self.joins.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Platform("Could not join the voice channel".into()));
        }
        let transport = FakeTransport::new(events);
        self.transports.lock().unwrap().push(transport.clone());
        Ok(transport)
    }
}

// ---------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------

#[derive(Default)]
pub struct FakeNotifier {
    pub notices: Mutex<Vec<String>>,
    pub posted: Mutex<Vec<PanelHandle>>,
    pub deleted: Mutex<Vec<PanelHandle>>,
    pub updates: AtomicUsize,
    next_message: AtomicU64,
}

impl FakeNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    pub fn posted_count(&self) -> usize {
        self.posted.lock().unwrap().len()
    }
}

#[async_trait]
impl StatusNotifier for FakeNotifier {
    async fn send_notice(&self, content: &str) -> Result<(), Error> {
        self.notices.lock().unwrap().push(content.to_string());
        Ok(())
    }

    async fn post_panel(&self, _panel: &NowPlayingPanel) -> Result<PanelHandle, Error> {
        let handle = PanelHandle {
            channel_id: 1,
            message_id: self.next_message.fetch_add(1, Ordering::SeqCst) + 1,
        };
        self.posted.lock().unwrap().push(handle);
        Ok(handle)
    }

    async fn update_panel(&self, _handle: &PanelHandle, _panel: &NowPlayingPanel) -> Result<(), Error> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_panel(&self, handle: &PanelHandle) -> Result<(), Error> {
        let mut deleted = self.deleted.lock().unwrap();
        if deleted.contains(handle) {
            return Err(Error::NotFound("Unknown Message".into()));
        }
        deleted.push(*handle);
        Ok(())
    }
}

// ---------------------------------------------------------------
// Catalog mocks
// ---------------------------------------------------------------

mock! {
    pub Primary {}
    #[async_trait]
    impl PrimaryCatalog for Primary {
        async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoCandidate>, Error>;
        async fn video(&self, url: &str) -> Result<VideoCandidate, Error>;
        async fn playlist(&self, url: &str, limit: usize) -> Result<PlaylistPage, Error>;
    }
}

mock! {
    pub Secondary {}
    #[async_trait]
    impl SecondaryCatalog for Secondary {
        async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<TrackRecord>, Error>;
        async fn get_track(&self, id: &str) -> Result<TrackRecord, Error>;
        async fn get_playlist(&self, id: &str, cap: usize) -> Result<TrackCollection, Error>;
        async fn get_album(&self, id: &str) -> Result<TrackCollection, Error>;
        async fn check_auth(&self) -> Result<(), Error>;
    }
}

// ---------------------------------------------------------------
// Queue harness
// ---------------------------------------------------------------

pub struct QueueHarness {
    pub queue: Arc<SessionQueue>,
    pub transport: Arc<FakeTransport>,
    pub pipeline: Arc<FakePipeline>,
    pub notifier: Arc<FakeNotifier>,
    pub registry: Arc<SessionRegistry>,
}

pub fn test_settings() -> QueueSettings {
    QueueSettings {
        default_volume: 50,
        reconnect_window: Duration::from_millis(100),
        panel_refresh_interval: Duration::from_secs(60),
    }
}

/// A registered queue with its event loop running.
pub fn queue_harness(settings: QueueSettings) -> QueueHarness {
    let (tx, rx): (UnboundedSender<TransportEvent>, UnboundedReceiver<TransportEvent>) = unbounded_channel();
    let transport = FakeTransport::new(tx);
    let pipeline = FakePipeline::new();
    let notifier = FakeNotifier::new();
    let registry = Arc::new(SessionRegistry::new());
    let queue = SessionQueue::new(
        SessionId(7),
        transport.clone(),
        pipeline.clone(),
        notifier.clone(),
        registry.clone(),
        settings,
    );
    let queue = registry.create(queue).expect("fresh registry");
    tokio::spawn(queue.clone().run_event_loop(rx));
    QueueHarness {
        queue,
        transport,
        pipeline,
        notifier,
        registry,
    }
}
