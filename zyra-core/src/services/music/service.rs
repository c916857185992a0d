// File: zyra-core/src/services/music/service.rs

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{info, warn};

use zyra_common::models::{MediaItem, Requester, Resolved, SessionId};
use zyra_common::traits::StatusNotifier;

use crate::Error;
use crate::services::music::locator::{LocatorConfig, MediaLocator};
use crate::services::music::registry::SessionRegistry;
use crate::services::music::session_queue::{QueueSettings, SessionQueue};
use crate::tasks::collection_fill::spawn_collection_fill;
use crate::voice::{StreamPipeline, VoiceGateway};

#[derive(Debug, Clone)]
pub struct MusicConfig {
    pub queue: QueueSettings,
    pub locator: LocatorConfig,
    /// Pause between background-fill members.
    pub fill_delay: Duration,
    pub join_timeout: Duration,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            queue: QueueSettings::default(),
            locator: LocatorConfig::default(),
            fill_delay: Duration::from_millis(500),
            join_timeout: Duration::from_secs(30),
        }
    }
}

/// What an enqueue added, for the command reply.
#[derive(Debug, Clone)]
pub enum EnqueueOutcome {
    Single {
        item: MediaItem,
        /// 0 = now playing, otherwise 1-based over upcoming.
        position: usize,
    },
    Collection {
        title: String,
        url: String,
        thumbnail_url: Option<String>,
        added: usize,
        /// Members still being resolved in the background.
        pending: usize,
    },
}

/// Session bootstrap shared by every command that needs a queue.
pub struct MusicService {
    registry: Arc<SessionRegistry>,
    gateway: Arc<dyn VoiceGateway>,
    pipeline: Arc<dyn StreamPipeline>,
    locator: Arc<MediaLocator>,
    config: MusicConfig,
    join_locks: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl MusicService {
    pub fn new(
        registry: Arc<SessionRegistry>,
        gateway: Arc<dyn VoiceGateway>,
        pipeline: Arc<dyn StreamPipeline>,
        locator: Arc<MediaLocator>,
        config: MusicConfig,
    ) -> Self {
        Self {
            registry,
            gateway,
            pipeline,
            locator,
            config,
            join_locks: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn locator(&self) -> &Arc<MediaLocator> {
        &self.locator
    }

    pub fn config(&self) -> &MusicConfig {
        &self.config
    }

    pub fn session(&self, id: SessionId) -> Option<Arc<SessionQueue>> {
        self.registry.get(id).filter(|q| !q.is_destroyed())
    }

    /// Returns the live queue for `id`, joining `voice_channel` and creating
    /// one when there is none. The flag tells whether it was created.
    pub async fn ensure_session(
        &self,
        id: SessionId,
        voice_channel: u64,
        notifier: Arc<dyn StatusNotifier>,
    ) -> Result<(Arc<SessionQueue>, bool), Error> {
        if let Some(queue) = self.session(id) {
            return Ok((queue, false));
        }

        // One join at a time per session; songbird hands out a single call per guild.
        let lock = self.join_locks.entry(id).or_default().clone();
        let result = {
            let _guard = lock.lock().await;
            self.create_session(id, voice_channel, notifier).await
        };
        drop(lock);
        // Waiters hold their own clone, so this only drops an idle lock.
        self.join_locks.remove_if(&id, |_, l| Arc::strong_count(l) == 1);
        result
    }

    /// Number of sessions with a join lock, held or waited on.
    pub fn joins_in_flight(&self) -> usize {
        self.join_locks.len()
    }

    async fn create_session(
        &self,
        id: SessionId,
        voice_channel: u64,
        notifier: Arc<dyn StatusNotifier>,
    ) -> Result<(Arc<SessionQueue>, bool), Error> {
        if let Some(queue) = self.session(id) {
            return Ok((queue, false));
        }

        let (events_tx, events_rx) = unbounded_channel();
        let transport = tokio::time::timeout(
            self.config.join_timeout,
            self.gateway.join(id, voice_channel, events_tx),
        )
        .await
        .map_err(|_| Error::Timeout("Could not join the voice channel in time.".into()))??;

        let queue = SessionQueue::new(
            id,
            transport,
            self.pipeline.clone(),
            notifier,
            self.registry.clone(),
            self.config.queue.clone(),
        );
        match self.registry.create(queue.clone()) {
            Ok(queue) => {
                tokio::spawn(queue.clone().run_event_loop(events_rx));
                info!("(MusicService) session {id} created in channel {voice_channel}");
                Ok((queue, true))
            }
            Err(Error::AlreadyExists(_)) => {
                // The transport shares the winner's connection, so it is dropped, not released.
                warn!("(MusicService) session {id} was created concurrently; using the existing queue");
                self.session(id)
                    .map(|q| (q, false))
                    .ok_or_else(|| Error::InvalidState(format!("session {id} vanished during creation")))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn start_if_idle(&self, queue: &Arc<SessionQueue>) -> bool {
        queue.start_if_idle().await
    }

    /// Enqueues a resolved query. Collections with unresolved members get a
    /// background fill tied to the session.
    pub async fn enqueue_resolved(
        &self,
        queue: &Arc<SessionQueue>,
        resolved: Resolved,
        requester: &Requester,
    ) -> Result<EnqueueOutcome, Error> {
        match resolved {
            Resolved::Single(item) => {
                let position = queue.enqueue(item.clone(), None).await?;
                Ok(EnqueueOutcome::Single { item, position })
            }
            Resolved::Collection(coll) => {
                let added = coll.items.len();
                let pending = coll.pending.len();
                if added > 0 {
                    queue.enqueue_all(coll.items).await?;
                }
                if pending > 0 {
                    spawn_collection_fill(
                        queue.clone(),
                        self.registry.clone(),
                        self.locator.resolver().clone(),
                        coll.pending,
                        requester.clone(),
                        coll.title.clone(),
                        self.config.fill_delay,
                    );
                }
                Ok(EnqueueOutcome::Collection {
                    title: coll.title,
                    url: coll.url,
                    thumbnail_url: coll.thumbnail_url,
                    added,
                    pending,
                })
            }
        }
    }

    /// Resolve, join if needed, enqueue and make sure something is playing.
    pub async fn play_query(
        &self,
        id: SessionId,
        voice_channel: u64,
        notifier: Arc<dyn StatusNotifier>,
        query: &str,
        requester: &Requester,
    ) -> Result<EnqueueOutcome, Error> {
        let resolved = self.locator.resolve(query, requester).await?;
        let (queue, _) = self.ensure_session(id, voice_channel, notifier).await?;
        let outcome = self.enqueue_resolved(&queue, resolved, requester).await?;
        self.start_if_idle(&queue).await;
        Ok(outcome)
    }

    pub async fn disconnect(&self, id: SessionId) -> Result<(), Error> {
        let queue = self
            .registry
            .get(id)
            .ok_or_else(|| Error::NotFound("I'm not in a voice channel.".into()))?;
        queue.stop().await;
        Ok(())
    }

    /// Stops every live session; used at shutdown.
    pub async fn shutdown(&self) {
        for id in self.registry.session_ids() {
            if let Some(queue) = self.registry.get(id) {
                queue.stop().await;
            }
        }
    }
}
