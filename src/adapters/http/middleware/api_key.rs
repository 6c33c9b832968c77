//! Shared API key middleware.
//!
//! Callers present the key in the `x-api-key` header. The comparison is
//! constant-time; rejected keys are logged by prefix only.
//!
//! ```text
//! Request → require_api_key → 401 {"status":"error",...}
//!                     ↓ (match)
//!                  Handler
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::adapters::http::honeypot::ErrorResponse;

/// Header carrying the caller's key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Characters of a rejected key that may appear in logs.
const LOGGED_KEY_PREFIX: usize = 8;

/// Expected key, shared across requests.
#[derive(Clone)]
pub struct ApiKeyState {
    expected: Arc<SecretString>,
}

impl ApiKeyState {
    pub fn new(expected: SecretString) -> Self {
        Self {
            expected: Arc::new(expected),
        }
    }

    /// Constant-time match against the expected key.
    pub fn matches(&self, provided: &str) -> bool {
        let expected = self.expected.expose_secret().as_bytes();
        expected.ct_eq(provided.as_bytes()).into()
    }
}

/// Rejects requests without a matching `x-api-key` header.
pub async fn require_api_key(
    State(state): State<ApiKeyState>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    match provided {
        Some(key) if state.matches(key) => next.run(request).await,
        Some(key) => {
            let prefix: String = key.chars().take(LOGGED_KEY_PREFIX).collect();
            tracing::warn!("Invalid API key received: {}...", prefix);
            unauthorized()
        }
        None => {
            tracing::warn!("Request without API key rejected");
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::invalid_request())).into_response()
}
