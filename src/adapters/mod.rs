//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - OpenAI-compatible chat provider and the persona reply generator
//! - `callback` - Final-result delivery over HTTP
//! - `http` - axum routes, middleware and request coercion
//! - `memory` - Process-lifetime session store

pub mod ai;
pub mod callback;
pub mod http;
pub mod memory;
