//! Session store port.
//!
//! Defines the contract for loading and saving Session aggregates, plus the
//! per-session critical section that serializes requests for the same id.
//!
//! # Design
//!
//! - **Aggregate-focused**: the whole Session is the unit of persistence
//! - **Swappable**: the in-memory adapter can be replaced by a key-value
//!   store without touching callers
//!
//! # Known limitations
//!
//! - Sessions are never evicted; they live as long as the store does
//! - The callback dispatcher retries persisting a delivery outcome once. If
//!   both saves fail, the session keeps `callback_in_progress` set and will
//!   not dispatch again until the store is repaired and the flag cleared

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OwnedMutexGuard;

use crate::domain::conversation::{reconcile, Message, Reconciled};
use crate::domain::foundation::{DomainError, ErrorCode, SessionId, Timestamp};
use crate::domain::session::Session;

/// Held for the duration of one request against a session.
pub type SessionGuard = OwnedMutexGuard<()>;

/// Session store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    #[error("session serialization failed: {0}")]
    Serialization(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::new(ErrorCode::StorageError, err.to_string())
    }
}

/// Port for Session aggregate persistence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Finds a session by id. Returns `None` for unseen ids.
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, StoreError>;

    /// Inserts or replaces a session.
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Acquires the critical section for `id`.
    ///
    /// Callers hold the guard across load → mutate → save.
    async fn lock(&self, id: &SessionId) -> SessionGuard;

    /// Loads a session, creating a fresh one for unseen ids.
    async fn load_or_create(&self, id: &SessionId, now: Timestamp) -> Result<Session, StoreError> {
        Ok(self
            .load(id)
            .await?
            .unwrap_or_else(|| Session::new(id.clone(), now)))
    }

    /// Merges caller-supplied history with the session's recorded turns.
    async fn combined_history(
        &self,
        id: &SessionId,
        external: &[Message],
    ) -> Result<Reconciled, StoreError> {
        let internal = self
            .load(id)
            .await?
            .map(|s| s.internal_history().to_vec())
            .unwrap_or_default();
        Ok(reconcile(external, &internal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SessionStore) {}
    }

    #[test]
    fn store_error_maps_to_storage_code() {
        let err: DomainError = StoreError::Unavailable("down".into()).into();
        assert_eq!(err.code, ErrorCode::StorageError);
    }
}
