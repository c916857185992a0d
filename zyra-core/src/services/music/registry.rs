// File: zyra-core/src/services/music/registry.rs

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use zyra_common::models::SessionId;

use crate::Error;
use crate::services::music::session_queue::SessionQueue;

/// Live session queues keyed by session id. One instance per process,
/// shared by `Arc`.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<SessionQueue>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SessionId) -> Option<Arc<SessionQueue>> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    /// Registers `queue` under its own id. Fails when a live queue already
    /// holds the slot; a destroyed leftover is replaced.
    pub fn create(&self, queue: Arc<SessionQueue>) -> Result<Arc<SessionQueue>, Error> {
        use dashmap::mapref::entry::Entry;

        let id = queue.id();
        match self.sessions.entry(id) {
            Entry::Occupied(mut slot) => {
                if !slot.get().is_destroyed() {
                    return Err(Error::AlreadyExists(format!("session {id} already has a queue")));
                }
                slot.insert(queue.clone());
            }
            Entry::Vacant(slot) => {
                slot.insert(queue.clone());
            }
        }
        debug!("(SessionRegistry) registered session {id}");
        Ok(queue)
    }

    pub fn remove(&self, id: SessionId) -> Option<Arc<SessionQueue>> {
        self.sessions.remove(&id).map(|(_, q)| q)
    }

    /// Removes the entry only if it still points at `queue`, so a stale
    /// teardown cannot evict a newer session.
    pub fn remove_if_same(&self, id: SessionId, queue: &SessionQueue) -> bool {
        let removed = self
            .sessions
            .remove_if(&id, |_, current| std::ptr::eq(Arc::as_ptr(current), queue))
            .is_some();
        if removed {
            debug!("(SessionRegistry) removed session {id}");
        }
        removed
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// True while `queue` is the registered queue for `id`.
    pub fn is_live(&self, id: SessionId, queue: &SessionQueue) -> bool {
        self.sessions
            .get(&id)
            .is_some_and(|entry| std::ptr::eq(Arc::as_ptr(entry.value()), queue))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|e| *e.key()).collect()
    }
}
