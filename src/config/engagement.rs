//! Engagement configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::session::CompletionPolicy;

/// Limits on how long the persona keeps a counterpart talking
#[derive(Debug, Clone, Deserialize)]
pub struct EngagementConfig {
    /// Logical turns required before high-value intelligence ends a session
    #[serde(default = "default_min_turns_with_intel")]
    pub min_turns_with_intel: usize,

    /// Logical turns after which a session ends regardless of yield
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Wall-clock cap on a session
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u64,

    /// Budget for one persona reply
    #[serde(default = "default_reply_timeout")]
    pub reply_timeout_secs: u64,

    /// Longest persona reply, in characters
    #[serde(default = "default_max_reply_chars")]
    pub max_reply_chars: usize,
}

impl EngagementConfig {
    pub fn completion_policy(&self) -> CompletionPolicy {
        CompletionPolicy {
            min_turns_with_intel: self.min_turns_with_intel,
            max_turns: self.max_turns,
            max_duration_secs: self.max_duration_secs,
        }
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }

    /// Validate engagement configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_turns_with_intel == 0
            || self.max_turns == 0
            || self.min_turns_with_intel > self.max_turns
            || self.max_duration_secs == 0
        {
            return Err(ValidationError::InvalidTurnLimits);
        }
        if self.reply_timeout_secs == 0 || self.max_reply_chars < 4 {
            return Err(ValidationError::InvalidReplyLimits);
        }
        Ok(())
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            min_turns_with_intel: default_min_turns_with_intel(),
            max_turns: default_max_turns(),
            max_duration_secs: default_max_duration(),
            reply_timeout_secs: default_reply_timeout(),
            max_reply_chars: default_max_reply_chars(),
        }
    }
}

fn default_min_turns_with_intel() -> usize {
    4
}

fn default_max_turns() -> usize {
    8
}

fn default_max_duration() -> u64 {
    300
}

fn default_reply_timeout() -> u64 {
    8
}

fn default_max_reply_chars() -> usize {
    500
}
