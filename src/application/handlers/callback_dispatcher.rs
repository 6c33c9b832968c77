//! CallbackDispatcher - background delivery of completion reports.
//!
//! Each completion event gets its own tokio task. The task delivers the
//! payload, then re-acquires the session lock, re-loads the session and
//! records the outcome. The in-flight flag is cleared on every path.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::session::RetryPolicy;
use crate::ports::{CallbackOutcome, CallbackPayload, CallbackSender, SessionStore, StoreError};

/// Attempts to persist the outcome before giving up.
const SETTLE_ATTEMPTS: usize = 2;

/// Spawns and settles completion callbacks.
#[derive(Clone)]
pub struct CallbackDispatcher {
    store: Arc<dyn SessionStore>,
    sender: Arc<dyn CallbackSender>,
    retry_policy: RetryPolicy,
    /// Upper bound on one whole delivery, retries included.
    deadline: Duration,
}

impl CallbackDispatcher {
    pub fn new(store: Arc<dyn SessionStore>, sender: Arc<dyn CallbackSender>) -> Self {
        Self {
            store,
            sender,
            retry_policy: RetryPolicy::default(),
            deadline: Duration::from_secs(15),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Delivers `payload` in the background.
    ///
    /// The caller must already have claimed the in-flight slot on the
    /// session (see `Session::begin_callback`) and saved it.
    pub fn dispatch(&self, session_id: SessionId, payload: CallbackPayload) -> JoinHandle<CallbackOutcome> {
        let this = self.clone();
        tokio::spawn(async move {
            let outcome = this.deliver(&payload).await;
            this.settle(&session_id, &outcome).await;
            outcome
        })
    }

    async fn deliver(&self, payload: &CallbackPayload) -> CallbackOutcome {
        match timeout(self.deadline, self.sender.send(payload)).await {
            Ok(outcome) => outcome,
            Err(_) => CallbackOutcome::failed(
                None,
                format!("callback timed out after {}ms", self.deadline.as_millis()),
            ),
        }
    }

    async fn settle(&self, session_id: &SessionId, outcome: &CallbackOutcome) {
        let _guard = self.store.lock(session_id).await;

        for attempt in 1..=SETTLE_ATTEMPTS {
            match self.apply(session_id, outcome).await {
                Ok(()) => return,
                Err(e) => tracing::warn!(
                    session_id = %session_id,
                    attempt,
                    "Failed to record callback outcome: {}",
                    e
                ),
            }
        }

        tracing::error!(
            session_id = %session_id,
            "Callback outcome not recorded; session may stay in flight"
        );
    }

    async fn apply(&self, session_id: &SessionId, outcome: &CallbackOutcome) -> Result<(), StoreError> {
        let Some(mut session) = self.store.load(session_id).await? else {
            tracing::warn!(session_id = %session_id, "Session vanished before callback settled");
            return Ok(());
        };

        if outcome.success {
            if let Err(e) = session.complete_callback() {
                tracing::warn!(session_id = %session_id, "Duplicate callback success: {}", e);
                session.release_callback();
            } else {
                tracing::info!(
                    session_id = %session_id,
                    status = ?outcome.status_code,
                    "Completion callback recorded"
                );
            }
        } else {
            session.fail_callback(Timestamp::now(), &self.retry_policy);
            tracing::warn!(
                session_id = %session_id,
                attempts = session.callback_attempts(),
                next_retry_at = ?session.next_retry_at().map(|t| t.canonical()),
                "Completion callback failed: {}",
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }

        self.store.save(&session).await
    }
}
