//! AI adapters - LLM providers and the persona reply generator.

mod mock_provider;
mod openai_provider;
mod persona_reply_generator;

pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{
    OpenAICompatibleConfig, OpenAICompatibleProvider, GEMINI_BASE_URL, OPENAI_BASE_URL,
};
pub use persona_reply_generator::{truncate_reply, PersonaReplyGenerator, FALLBACK_REPLIES};
