//! Callback sender port - delivers the final engagement report upstream.
//!
//! The sender only performs delivery. At-most-once success is enforced by the
//! session lifecycle, so calling `send` twice with the same payload is safe.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::intelligence::ExtractedIntelligence;
use crate::domain::session::Session;

/// Snapshot of a session reported on completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
    pub session_id: String,
    pub scam_detected: bool,
    pub total_messages_exchanged: u64,
    pub extracted_intelligence: ExtractedIntelligence,
    pub agent_notes: String,
}

impl CallbackPayload {
    /// Captures the reportable state of `session`.
    pub fn from_session(session: &Session) -> Self {
        Self {
            session_id: session.id().to_string(),
            scam_detected: session.scam_detected(),
            total_messages_exchanged: session.total_messages_exchanged(),
            extracted_intelligence: session.extracted_intelligence().clone(),
            agent_notes: session.agent_notes().to_string(),
        }
    }
}

/// Result of one delivery (possibly spanning several attempts).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub success: bool,
    /// Last HTTP status observed, if any response arrived.
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl CallbackOutcome {
    pub fn delivered(status_code: u16) -> Self {
        Self {
            success: true,
            status_code: Some(status_code),
            error: None,
        }
    }

    pub fn failed(status_code: Option<u16>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code,
            error: Some(error.into()),
        }
    }
}

/// Errors from a single delivery attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallbackError {
    #[error("callback timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("callback rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("callback transport error: {0}")]
    Transport(String),
}

impl CallbackError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CallbackError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<CallbackError> for CallbackOutcome {
    fn from(err: CallbackError) -> Self {
        CallbackOutcome::failed(err.status_code(), err.to_string())
    }
}

/// Port for delivering completion reports.
#[async_trait]
pub trait CallbackSender: Send + Sync {
    /// Delivers `payload`. Never panics; failures are reported in the outcome.
    async fn send(&self, payload: &CallbackPayload) -> CallbackOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SessionId, Timestamp};

    #[test]
    fn callback_sender_is_object_safe() {
        fn _accepts_dyn(_sender: &dyn CallbackSender) {}
    }

    #[test]
    fn payload_serializes_upstream_field_names() {
        let mut session = Session::new(SessionId::new("abc").unwrap(), Timestamp::now());
        session.mark_scam_detected();
        session.set_agent_notes("Scam detected.");

        let json = serde_json::to_value(CallbackPayload::from_session(&session)).unwrap();

        assert_eq!(json["sessionId"], "abc");
        assert_eq!(json["scamDetected"], true);
        assert_eq!(json["totalMessagesExchanged"], 0);
        assert_eq!(json["agentNotes"], "Scam detected.");
        assert!(json["extractedIntelligence"]["upiIds"].is_array());
    }

    #[test]
    fn rejected_error_keeps_status() {
        let outcome: CallbackOutcome = CallbackError::Rejected {
            status: 503,
            body: "busy".into(),
        }
        .into();
        assert!(!outcome.success);
        assert_eq!(outcome.status_code, Some(503));
    }
}
