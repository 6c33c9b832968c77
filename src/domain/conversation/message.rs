//! Conversation turns.
//!
//! [`Message`] is the strict, immutable turn type the pipeline works with.
//! [`StoredTurn`] is the loosely typed record kept in a session's internal
//! history; it only becomes a `Message` again through [`Message::try_from`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Timestamp, ValidationError};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The suspected scammer on the other end of the conversation.
    Counterpart,
    /// The honeypot persona.
    Agent,
}

impl Sender {
    /// Wire name used by the upstream platform.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Sender::Counterpart => "scammer",
            Sender::Agent => "user",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for Sender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scammer" | "counterpart" => Ok(Sender::Counterpart),
            "user" | "agent" => Ok(Sender::Agent),
            other => Err(ValidationError::invalid_format(
                "sender",
                format!("unknown sender '{}'", other),
            )),
        }
    }
}

/// A single conversational turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: Timestamp,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp,
        }
    }

    pub fn counterpart(text: impl Into<String>, timestamp: Timestamp) -> Self {
        Self::new(Sender::Counterpart, text, timestamp)
    }

    pub fn agent(text: impl Into<String>, timestamp: Timestamp) -> Self {
        Self::new(Sender::Agent, text, timestamp)
    }

    pub fn is_from(&self, sender: Sender) -> bool {
        self.sender == sender
    }
}

/// A turn as recorded in a session's internal history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTurn {
    pub sender: String,
    pub text: String,
    pub timestamp: String,
}

impl From<&Message> for StoredTurn {
    fn from(msg: &Message) -> Self {
        Self {
            sender: msg.sender.as_wire().to_string(),
            text: msg.text.clone(),
            timestamp: msg.timestamp.canonical(),
        }
    }
}

impl TryFrom<&StoredTurn> for Message {
    type Error = ValidationError;

    fn try_from(turn: &StoredTurn) -> Result<Self, Self::Error> {
        let sender = turn.sender.parse::<Sender>()?;
        let timestamp = Timestamp::parse(&turn.timestamp).ok_or_else(|| {
            ValidationError::invalid_format("timestamp", format!("'{}'", turn.timestamp))
        })?;
        Ok(Message::new(sender, turn.text.clone(), timestamp))
    }
}

/// Joins the text of every turn with a single space.
pub fn transcript_text(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
