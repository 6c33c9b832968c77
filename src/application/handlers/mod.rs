//! Command handlers.
//!
//! - `EngageHandler` - runs one counterpart message through the pipeline
//! - `CallbackDispatcher` - delivers the completion report off the request path

mod callback_dispatcher;
mod engage;

pub use callback_dispatcher::CallbackDispatcher;
pub use engage::{EngageCommand, EngageError, EngageHandler, EngageResult};
