//! Recording Callback Sender for testing.
//!
//! Returns pre-configured outcomes in order (success by default) and keeps
//! every payload it was asked to deliver.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{CallbackOutcome, CallbackPayload, CallbackSender};

#[derive(Debug, Clone, Default)]
pub struct RecordingCallbackSender {
    outcomes: Arc<Mutex<VecDeque<CallbackOutcome>>>,
    sent: Arc<Mutex<Vec<CallbackPayload>>>,
    delay: Duration,
}

impl RecordingCallbackSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful delivery.
    pub fn with_success(self) -> Self {
        self.push(CallbackOutcome::delivered(200))
    }

    /// Queues a failed delivery.
    pub fn with_failure(self, status_code: u16) -> Self {
        self.push(CallbackOutcome::failed(
            Some(status_code),
            format!("upstream returned {}", status_code),
        ))
    }

    /// Simulated latency per delivery.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues `count` failed deliveries behind any already queued outcomes.
    pub fn fail_next(&self, count: usize) {
        let mut outcomes = self.outcomes.lock().unwrap();
        for _ in 0..count {
            outcomes.push_back(CallbackOutcome::failed(Some(500), "upstream returned 500"));
        }
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// All payloads received, in call order.
    pub fn sent(&self) -> Vec<CallbackPayload> {
        self.sent.lock().unwrap().clone()
    }

    fn push(self, outcome: CallbackOutcome) -> Self {
        self.outcomes.lock().unwrap().push_back(outcome);
        self
    }
}

#[async_trait]
impl CallbackSender for RecordingCallbackSender {
    async fn send(&self, payload: &CallbackPayload) -> CallbackOutcome {
        self.sent.lock().unwrap().push(payload.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| CallbackOutcome::delivered(200))
    }
}
