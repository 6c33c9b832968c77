//! Completion callback configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::callback::DEFAULT_CALLBACK_URL;
use crate::domain::session::RetryPolicy;

/// Where and how the final session report is delivered
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackConfig {
    /// Upstream result endpoint
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-attempt HTTP timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Tries per dispatch before the dispatch counts as failed
    #[serde(default = "default_attempts")]
    pub attempts_per_dispatch: u32,

    /// Pause between tries within one dispatch
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Failed dispatches before the cool-down starts
    #[serde(default = "default_cooldown_after_failures")]
    pub cooldown_after_failures: u32,

    /// Cool-down length
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,
}

impl CallbackConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            cooldown_after_failures: self.cooldown_after_failures,
            cooldown_secs: self.cooldown_secs,
        }
    }

    /// Upper bound on one whole dispatch, with a second of slack.
    pub fn dispatch_deadline(&self) -> Duration {
        let attempts = self.attempts_per_dispatch.max(1);
        self.timeout() * attempts + self.retry_delay() * (attempts - 1) + Duration::from_secs(1)
    }

    /// Validate callback configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ValidationError::InvalidCallbackUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 60 {
            return Err(ValidationError::InvalidTimeout);
        }
        if !(1..=5).contains(&self.attempts_per_dispatch) {
            return Err(ValidationError::InvalidCallbackAttempts);
        }
        Ok(())
    }
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout(),
            attempts_per_dispatch: default_attempts(),
            retry_delay_ms: default_retry_delay(),
            cooldown_after_failures: default_cooldown_after_failures(),
            cooldown_secs: default_cooldown(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_CALLBACK_URL.to_string()
}

fn default_timeout() -> u64 {
    5
}

fn default_attempts() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    200
}

fn default_cooldown_after_failures() -> u32 {
    3
}

fn default_cooldown() -> u64 {
    60
}
