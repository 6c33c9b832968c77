//! HTTP adapter for the honeypot endpoint.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    coerce_timestamp, history_entry, EngagementMetrics, ErrorResponse, HealthResponse,
    HoneypotRequest, HoneypotResponse, IncomingMessage, RequestError, RequestMetadata,
    ERROR_MESSAGE,
};
pub use handlers::HoneypotHandlers;
pub use routes::honeypot_routes;
