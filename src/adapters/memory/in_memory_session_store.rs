//! In-Memory Session Store Adapter
//!
//! Keeps sessions for the lifetime of the process. Sessions are never
//! evicted.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::foundation::SessionId;
use crate::domain::session::Session;
use crate::ports::{SessionGuard, SessionStore, StoreError};

/// In-memory session storage with one async mutex per session id.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    locks: Arc<RwLock<HashMap<SessionId, Arc<Mutex<()>>>>>,
    failing_saves: Arc<AtomicUsize>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` saves fail with `Unavailable` (for tests).
    pub fn fail_next_saves(&self, count: usize) {
        self.failing_saves.store(count, Ordering::SeqCst);
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Clear all stored data (useful for tests).
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
        self.locks.write().await.clear();
    }

    fn take_injected_failure(&self) -> bool {
        self.failing_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        if self.take_injected_failure() {
            return Err(StoreError::Unavailable("injected save failure".to_string()));
        }
        self.sessions
            .write()
            .await
            .insert(session.id().clone(), session.clone());
        Ok(())
    }

    async fn lock(&self, id: &SessionId) -> SessionGuard {
        let mutex = {
            let mut locks = self.locks.write().await;
            locks
                .entry(id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        mutex.lock_owned().await
    }
}
