//! HTTP DTOs for the honeypot endpoint.
//!
//! Requests come from a platform that is loose about types: senders vary in
//! naming, timestamps arrive as ISO strings or epoch numbers, and history
//! entries are sometimes junk. Coercion happens here so the application layer
//! only sees strict [`Message`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::application::{EngageCommand, EngageResult};
use crate::domain::conversation::{Message, Sender};
use crate::domain::foundation::{SessionId, Timestamp, ValidationError};
use crate::domain::intelligence::ExtractedIntelligence;

/// Epoch values above this are read as milliseconds.
const EPOCH_MILLIS_CUTOFF: f64 = 1e11;

/// Message shown to callers for any rejected request.
pub const ERROR_MESSAGE: &str = "Invalid API key or malformed request";

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/honeypot`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoneypotRequest {
    pub session_id: String,
    pub message: IncomingMessage,
    #[serde(default)]
    pub conversation_history: Option<Value>,
    #[serde(default)]
    pub metadata: Option<RequestMetadata>,
}

/// The counterpart message being answered.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

/// Optional channel context.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestMetadata {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

/// Why a well-formed JSON body was still rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid session id: {0}")]
    SessionId(#[from] ValidationError),

    #[error("message text is empty")]
    EmptyText,
}

impl HoneypotRequest {
    /// Coerces the request into an engagement command.
    ///
    /// `now` stands in for a missing or unparseable current timestamp.
    pub fn into_command(self, now: Timestamp) -> Result<EngageCommand, RequestError> {
        let session_id = SessionId::new(self.session_id)?;

        let text = self.message.text.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(RequestError::EmptyText);
        }
        let sender = self
            .message
            .sender
            .as_deref()
            .and_then(|s| s.parse::<Sender>().ok())
            .unwrap_or(Sender::Counterpart);
        let timestamp = self
            .message
            .timestamp
            .as_ref()
            .and_then(coerce_timestamp)
            .unwrap_or(now);

        let history = match self.conversation_history {
            Some(Value::Array(entries)) => entries.iter().filter_map(history_entry).collect(),
            _ => Vec::new(),
        };

        Ok(EngageCommand {
            session_id,
            message: Message::new(sender, text, timestamp),
            history,
        })
    }
}

/// Coerces one history entry, dropping entries without usable text.
///
/// Entries with an unknown sender count as counterpart turns; entries with a
/// missing or unreadable timestamp are pinned to the Unix epoch so they sort
/// first and deduplicate consistently across requests.
pub fn history_entry(value: &Value) -> Option<Message> {
    let entry = value.as_object()?;
    let text = entry.get("text")?.as_str()?;
    if text.trim().is_empty() {
        return None;
    }
    let sender = entry
        .get("sender")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Sender>().ok())
        .unwrap_or(Sender::Counterpart);
    let timestamp = entry
        .get("timestamp")
        .and_then(coerce_timestamp)
        .or_else(|| Timestamp::from_unix_secs(0))?;
    Some(Message::new(sender, text, timestamp))
}

/// Reads an ISO-8601 string or an epoch number (seconds or milliseconds).
pub fn coerce_timestamp(value: &Value) -> Option<Timestamp> {
    match value {
        Value::String(s) => {
            Timestamp::parse(s).or_else(|| s.trim().parse::<f64>().ok().and_then(from_epoch))
        }
        Value::Number(n) => n.as_f64().and_then(from_epoch),
        _ => None,
    }
}

fn from_epoch(value: f64) -> Option<Timestamp> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    if value > EPOCH_MILLIS_CUTOFF {
        Timestamp::from_unix_millis(value as i64)
    } else {
        Timestamp::from_unix_millis((value * 1000.0) as i64)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Successful (or neutral) engagement response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoneypotResponse {
    pub status: String,
    pub reply: String,
    pub scam_detected: bool,
    pub engagement_metrics: EngagementMetrics,
    pub extracted_intelligence: ExtractedIntelligence,
    pub agent_notes: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    pub engagement_duration_seconds: u64,
    pub total_messages_exchanged: u64,
}

impl HoneypotResponse {
    /// Non-committal response that reveals nothing about internal state.
    pub fn neutral(reply: String) -> Self {
        Self {
            status: "success".to_string(),
            agent_notes: reply.clone(),
            reply,
            scam_detected: false,
            engagement_metrics: EngagementMetrics::default(),
            extracted_intelligence: ExtractedIntelligence::default(),
        }
    }
}

impl From<EngageResult> for HoneypotResponse {
    fn from(result: EngageResult) -> Self {
        Self {
            status: "success".to_string(),
            reply: result.reply,
            scam_detected: result.scam_detected,
            engagement_metrics: EngagementMetrics {
                engagement_duration_seconds: result.engagement_duration_secs,
                total_messages_exchanged: result.total_messages_exchanged,
            },
            extracted_intelligence: result.extracted_intelligence,
            agent_notes: result.agent_notes,
        }
    }
}

/// Error body for rejected requests.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn invalid_request() -> Self {
        Self {
            status: "error".to_string(),
            message: ERROR_MESSAGE.to_string(),
        }
    }
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub endpoint: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok",
            service: "honeypot",
            endpoint: "/api/honeypot",
        }
    }
}
