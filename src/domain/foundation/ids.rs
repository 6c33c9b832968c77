//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Maximum accepted length of a caller-supplied session identifier.
pub const MAX_SESSION_ID_LENGTH: usize = 256;

/// Opaque identifier for an engagement session.
///
/// Session ids are chosen by the upstream platform, so unlike most ids they
/// are arbitrary non-empty strings rather than UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a SessionId, rejecting blank or oversized values.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("sessionId"));
        }
        if trimmed.len() > MAX_SESSION_ID_LENGTH {
            return Err(ValidationError::invalid_format(
                "sessionId",
                format!("longer than {} bytes", MAX_SESSION_ID_LENGTH),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
