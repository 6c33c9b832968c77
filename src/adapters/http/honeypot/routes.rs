//! HTTP routes for the honeypot endpoint.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers::{engage, health, HoneypotHandlers};
use crate::adapters::http::middleware::{require_api_key, ApiKeyState};

/// Creates the honeypot router.
///
/// `POST /api/honeypot` requires the API key; `GET /` does not.
pub fn honeypot_routes(handlers: HoneypotHandlers, api_key: ApiKeyState) -> Router {
    Router::new()
        .route("/api/honeypot", post(engage))
        .route_layer(middleware::from_fn_with_state(api_key, require_api_key))
        .route("/", get(health))
        .with_state(handlers)
}
