//! Session aggregate entity.
//!
//! A session holds everything the honeypot knows about one conversation:
//! detection state, accumulated intelligence, the turns it has recorded
//! itself, and the completion-callback bookkeeping.
//!
//! # Ownership
//!
//! The session is the serialization unit for persistence. All mutation goes
//! through the methods below so the write-once flags cannot be reverted.

use serde::{Deserialize, Serialize};

use super::completion::RetryPolicy;
use super::status::EngagementStatus;
use crate::domain::conversation::{Message, StoredTurn};
use crate::domain::foundation::{DomainError, ErrorCode, SessionId, StateMachine, Timestamp};
use crate::domain::intelligence::{ExtractedIntelligence, MergeDelta};

/// Session aggregate - per-conversation engagement state.
///
/// # Invariants
///
/// - `scam_detected` only moves false → true
/// - `extracted_intelligence` only grows
/// - at most one callback is in flight at any instant
/// - `callback_sent` is terminal: no callback is dispatched afterwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    id: SessionId,
    started_at: Timestamp,
    total_messages_exchanged: u64,
    scam_detected: bool,
    extracted_intelligence: ExtractedIntelligence,
    internal_history: Vec<StoredTurn>,
    callback_sent: bool,
    callback_in_progress: bool,
    callback_attempts: u32,
    next_retry_at: Option<Timestamp>,
    agent_notes: String,
}

impl Session {
    /// Creates an empty session first seen at `now`.
    pub fn new(id: SessionId, now: Timestamp) -> Self {
        Self {
            id,
            started_at: now,
            total_messages_exchanged: 0,
            scam_detected: false,
            extracted_intelligence: ExtractedIntelligence::default(),
            internal_history: Vec::new(),
            callback_sent: false,
            callback_in_progress: false,
            callback_attempts: 0,
            next_retry_at: None,
            agent_notes: String::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn total_messages_exchanged(&self) -> u64 {
        self.total_messages_exchanged
    }

    pub fn scam_detected(&self) -> bool {
        self.scam_detected
    }

    pub fn extracted_intelligence(&self) -> &ExtractedIntelligence {
        &self.extracted_intelligence
    }

    /// Turns this process has recorded, in arrival order.
    pub fn internal_history(&self) -> &[StoredTurn] {
        &self.internal_history
    }

    pub fn callback_sent(&self) -> bool {
        self.callback_sent
    }

    pub fn callback_in_progress(&self) -> bool {
        self.callback_in_progress
    }

    /// Number of failed callback attempts so far.
    pub fn callback_attempts(&self) -> u32 {
        self.callback_attempts
    }

    pub fn next_retry_at(&self) -> Option<Timestamp> {
        self.next_retry_at
    }

    pub fn agent_notes(&self) -> &str {
        &self.agent_notes
    }

    /// Whole seconds since the session started, never negative.
    pub fn engagement_duration_secs(&self, now: Timestamp) -> u64 {
        now.duration_since(&self.started_at).num_seconds().max(0) as u64
    }

    /// Lifecycle status derived from the flags.
    pub fn status(&self) -> EngagementStatus {
        if self.callback_sent {
            EngagementStatus::Completed
        } else if self.callback_in_progress {
            EngagementStatus::Completing
        } else if self.callback_attempts > 0 {
            EngagementStatus::RetryWait
        } else if self.scam_detected {
            EngagementStatus::Engaged
        } else {
            EngagementStatus::New
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversation
    // ─────────────────────────────────────────────────────────────────────────

    /// Appends a turn to the internal history and bumps the message counter.
    pub fn record_turn(&mut self, message: &Message) {
        self.internal_history.push(StoredTurn::from(message));
        self.total_messages_exchanged += 1;
    }

    /// Marks the session as a scam. Returns true only on the first call.
    pub fn mark_scam_detected(&mut self) -> bool {
        if self.scam_detected {
            return false;
        }
        self.scam_detected = true;
        true
    }

    /// Unions new findings into the accumulated intelligence.
    pub fn merge_intelligence(&mut self, found: &ExtractedIntelligence) -> MergeDelta {
        self.extracted_intelligence.merge(found)
    }

    pub fn set_agent_notes(&mut self, notes: impl Into<String>) {
        self.agent_notes = notes.into();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Completion callback
    // ─────────────────────────────────────────────────────────────────────────

    /// True when a callback may be started at `now`.
    pub fn can_dispatch_callback(&self, now: Timestamp) -> bool {
        self.scam_detected
            && !self.callback_sent
            && !self.callback_in_progress
            && self.retry_window_elapsed(now)
    }

    /// Claims the in-flight slot for a callback.
    ///
    /// # Errors
    ///
    /// - `CallbackAlreadySent` if a callback was already delivered
    /// - `CallbackInFlight` if another callback is running
    /// - `InvalidStateTransition` if no scam was detected or the cool-down
    ///   window is still active
    pub fn begin_callback(&mut self, now: Timestamp) -> Result<(), DomainError> {
        if self.callback_sent {
            return Err(DomainError::new(
                ErrorCode::CallbackAlreadySent,
                "Completion callback already delivered",
            ));
        }
        if self.callback_in_progress {
            return Err(DomainError::new(
                ErrorCode::CallbackInFlight,
                "Completion callback already in flight",
            ));
        }
        if !self.retry_window_elapsed(now) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Callback cool-down window still active",
            )
            .with_detail("next_retry_at", self.next_retry_at_display()));
        }
        self.status().transition_to(EngagementStatus::Completing)?;

        self.callback_in_progress = true;
        Ok(())
    }

    /// Records a delivered callback. Terminal.
    ///
    /// # Errors
    ///
    /// - `CallbackAlreadySent` if a callback was already delivered
    pub fn complete_callback(&mut self) -> Result<(), DomainError> {
        if self.callback_sent {
            return Err(DomainError::new(
                ErrorCode::CallbackAlreadySent,
                "Completion callback already delivered",
            ));
        }
        self.callback_sent = true;
        self.callback_in_progress = false;
        Ok(())
    }

    /// Records a failed callback and starts the cool-down when due.
    pub fn fail_callback(&mut self, now: Timestamp, policy: &RetryPolicy) {
        self.callback_attempts += 1;
        if self.callback_attempts >= policy.cooldown_after_failures {
            self.next_retry_at = Some(now.plus_secs(policy.cooldown_secs));
        }
        self.callback_in_progress = false;
    }

    /// Clears the in-flight flag without recording an outcome.
    pub fn release_callback(&mut self) {
        self.callback_in_progress = false;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn retry_window_elapsed(&self, now: Timestamp) -> bool {
        match self.next_retry_at {
            Some(at) => !now.is_before(&at),
            None => true,
        }
    }

    fn next_retry_at_display(&self) -> String {
        self.next_retry_at
            .map(|t| t.canonical())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn t0() -> Timestamp {
        Timestamp::from_unix_secs(1_768_000_000).unwrap()
    }

    fn test_session() -> Session {
        Session::new(SessionId::new("sess-1").unwrap(), t0())
    }

    fn scam_session() -> Session {
        let mut session = test_session();
        session.mark_scam_detected();
        session
    }

    // Construction tests

    #[test]
    fn new_session_starts_zeroed() {
        let session = test_session();
        assert_eq!(session.total_messages_exchanged(), 0);
        assert!(!session.scam_detected());
        assert!(session.extracted_intelligence().is_empty());
        assert!(session.internal_history().is_empty());
        assert_eq!(session.status(), EngagementStatus::New);
    }

    // Conversation tests

    #[test]
    fn record_turn_appends_and_counts() {
        let mut session = test_session();
        session.record_turn(&Message::counterpart("hi", t0()));
        session.record_turn(&Message::agent("hello", t0()));

        assert_eq!(session.total_messages_exchanged(), 2);
        assert_eq!(session.internal_history()[0].sender, "scammer");
        assert_eq!(session.internal_history()[1].sender, "user");
    }

    #[test]
    fn scam_detection_is_write_once() {
        let mut session = test_session();
        assert!(session.mark_scam_detected());
        assert!(!session.mark_scam_detected());
        assert!(session.scam_detected());
        assert_eq!(session.status(), EngagementStatus::Engaged);
    }

    #[test]
    fn intelligence_only_grows() {
        let mut session = test_session();
        let first = ExtractedIntelligence {
            upi_ids: BTreeSet::from(["a@ybl".to_string()]),
            ..Default::default()
        };
        session.merge_intelligence(&first);
        session.merge_intelligence(&ExtractedIntelligence::default());

        assert_eq!(session.extracted_intelligence().upi_ids.len(), 1);
    }

    #[test]
    fn duration_is_clamped_at_zero() {
        let session = test_session();
        assert_eq!(session.engagement_duration_secs(t0().plus_secs(42)), 42);
        let earlier = Timestamp::from_unix_secs(1_767_999_000).unwrap();
        assert_eq!(session.engagement_duration_secs(earlier), 0);
    }

    // Callback tests

    #[test]
    fn cannot_dispatch_before_detection() {
        let mut session = test_session();
        assert!(!session.can_dispatch_callback(t0()));
        let err = session.begin_callback(t0()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn begin_callback_claims_in_flight_slot() {
        let mut session = scam_session();
        session.begin_callback(t0()).unwrap();

        assert_eq!(session.status(), EngagementStatus::Completing);
        assert!(!session.can_dispatch_callback(t0()));
        let err = session.begin_callback(t0()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CallbackInFlight);
    }

    #[test]
    fn successful_callback_is_terminal() {
        let mut session = scam_session();
        session.begin_callback(t0()).unwrap();
        session.complete_callback().unwrap();

        assert!(session.callback_sent());
        assert!(!session.callback_in_progress());
        assert_eq!(session.status(), EngagementStatus::Completed);
        assert!(!session.can_dispatch_callback(t0().plus_secs(3600)));
        let err = session.begin_callback(t0()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CallbackAlreadySent);
    }

    #[test]
    fn failures_below_threshold_allow_immediate_retry() {
        let mut session = scam_session();
        let policy = RetryPolicy::default();

        session.begin_callback(t0()).unwrap();
        session.fail_callback(t0(), &policy);

        assert_eq!(session.callback_attempts(), 1);
        assert_eq!(session.next_retry_at(), None);
        assert_eq!(session.status(), EngagementStatus::RetryWait);
        assert!(session.can_dispatch_callback(t0()));
    }

    #[test]
    fn third_failure_starts_cooldown() {
        let mut session = scam_session();
        let policy = RetryPolicy::default();

        for _ in 0..3 {
            session.begin_callback(t0()).unwrap();
            session.fail_callback(t0(), &policy);
        }

        assert_eq!(session.next_retry_at(), Some(t0().plus_secs(60)));
        assert!(!session.can_dispatch_callback(t0().plus_secs(59)));
        assert!(session.begin_callback(t0().plus_secs(59)).is_err());
        assert!(session.can_dispatch_callback(t0().plus_secs(60)));
    }

    #[test]
    fn release_clears_in_flight_without_counting() {
        let mut session = scam_session();
        session.begin_callback(t0()).unwrap();
        session.release_callback();

        assert!(!session.callback_in_progress());
        assert_eq!(session.callback_attempts(), 0);
        assert!(session.can_dispatch_callback(t0()));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let session = scam_session();
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["scamDetected"], true);
        assert_eq!(json["callbackSent"], false);
        assert!(json["nextRetryAt"].is_null());

        let back: Session = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
    }
}
