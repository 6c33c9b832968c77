//! Application layer - command handlers.
//!
//! Orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{CallbackDispatcher, EngageCommand, EngageError, EngageHandler, EngageResult};
