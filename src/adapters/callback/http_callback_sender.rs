//! HTTP Callback Sender - posts the final engagement report as JSON.
//!
//! # Configuration
//!
//! ```ignore
//! let sender = HttpCallbackSender::new(url, Duration::from_secs(5))?
//!     .with_attempts(2)
//!     .with_retry_delay(Duration::from_millis(200));
//! ```
//!
//! A delivery makes up to `attempts` POSTs separated by a fixed delay. Any
//! 2xx response counts as success.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{CallbackError, CallbackOutcome, CallbackPayload, CallbackSender};

/// Default upstream endpoint for final results.
pub const DEFAULT_CALLBACK_URL: &str = "https://hackathon.guvi.in/api/updateHoneyPotFinalResult";

/// reqwest-backed callback sender.
#[derive(Debug, Clone)]
pub struct HttpCallbackSender {
    client: Client,
    url: String,
    timeout: Duration,
    attempts: u32,
    retry_delay: Duration,
}

impl HttpCallbackSender {
    /// Creates a sender posting to `url` with a per-attempt `timeout`.
    ///
    /// # Errors
    ///
    /// - `Transport` if the HTTP client cannot be built
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CallbackError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CallbackError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
            attempts: 2,
            retry_delay: Duration::from_millis(200),
        })
    }

    /// Sets the number of attempts per delivery (at least one).
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post_once(&self, payload: &CallbackPayload) -> Result<u16, CallbackError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CallbackError::Timeout {
                        timeout_secs: self.timeout.as_secs(),
                    }
                } else {
                    CallbackError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(status.as_u16());
        }

        let body = response.text().await.unwrap_or_default();
        Err(CallbackError::Rejected {
            status: status.as_u16(),
            body: truncate(&body, 200),
        })
    }
}

#[async_trait]
impl CallbackSender for HttpCallbackSender {
    async fn send(&self, payload: &CallbackPayload) -> CallbackOutcome {
        let mut last_error = CallbackError::Transport("No attempts made".to_string());

        for attempt in 1..=self.attempts {
            match self.post_once(payload).await {
                Ok(status) => {
                    tracing::info!(
                        session_id = %payload.session_id,
                        attempt,
                        status,
                        "Callback delivered"
                    );
                    return CallbackOutcome::delivered(status);
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %payload.session_id,
                        attempt,
                        "Callback attempt failed: {}",
                        e
                    );
                    last_error = e;
                }
            }

            if attempt < self.attempts {
                sleep(self.retry_delay).await;
            }
        }

        last_error.into()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
