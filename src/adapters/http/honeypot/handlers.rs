//! HTTP handlers for the honeypot endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{EngageError, EngageHandler};
use crate::domain::foundation::Timestamp;

use super::dto::{ErrorResponse, HealthResponse, HoneypotRequest, HoneypotResponse};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct HoneypotHandlers {
    engage_handler: Arc<EngageHandler>,
}

impl HoneypotHandlers {
    pub fn new(engage_handler: Arc<EngageHandler>) -> Self {
        Self { engage_handler }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET / - Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// POST /api/honeypot - Answer one counterpart message
pub async fn engage(
    State(handlers): State<HoneypotHandlers>,
    payload: Result<Json<HoneypotRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("Malformed honeypot request: {}", rejection.body_text());
            return bad_request();
        }
    };

    if let Some(metadata) = &request.metadata {
        tracing::debug!(
            channel = metadata.channel.as_deref().unwrap_or("unknown"),
            language = metadata.language.as_deref().unwrap_or("unknown"),
            locale = metadata.locale.as_deref().unwrap_or("unknown"),
            "Request metadata"
        );
    }

    let cmd = match request.into_command(Timestamp::now()) {
        Ok(cmd) => cmd,
        Err(e) => {
            tracing::warn!("Rejected honeypot request: {}", e);
            return bad_request();
        }
    };

    match handlers.engage_handler.handle(cmd).await {
        Ok(result) => (StatusCode::OK, Json(HoneypotResponse::from(result))).into_response(),
        Err(e) => handle_engage_error(e, &handlers),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::invalid_request())).into_response()
}

/// Internal failures never reach the counterpart; they get a neutral reply.
fn handle_engage_error(error: EngageError, handlers: &HoneypotHandlers) -> Response {
    tracing::error!("Engagement failed, returning neutral reply: {}", error);
    let reply = handlers.engage_handler.fallback_reply();
    (StatusCode::OK, Json(HoneypotResponse::neutral(reply))).into_response()
}
