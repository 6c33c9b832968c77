//! HTTP middleware for axum.
//!
//! - `api_key` - shared-key check for the honeypot endpoint

pub mod api_key;

pub use api_key::{require_api_key, ApiKeyState};
