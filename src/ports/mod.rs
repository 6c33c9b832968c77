//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionStore` - Session persistence and per-session locking
//! - `CallbackSender` - Final-result delivery upstream
//! - `AIProvider` - LLM chat completions
//! - `ReplyGenerator` - Persona replies with a static fallback

mod ai_provider;
mod callback_sender;
mod reply_generator;
mod session_store;

pub use ai_provider::{
    AIError, AIProvider, ChatMessage, CompletionRequest, CompletionResponse, FinishReason,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use callback_sender::{CallbackError, CallbackOutcome, CallbackPayload, CallbackSender};
pub use reply_generator::{ReplyContext, ReplyGenerator};
pub use session_store::{SessionGuard, SessionStore, StoreError};
