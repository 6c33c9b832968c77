//! Reply generator port - produces the persona's next message.

use async_trait::async_trait;

use super::AIError;
use crate::domain::conversation::Message;
use crate::domain::intelligence::ExtractedIntelligence;

/// Everything the persona needs to write its next line.
#[derive(Debug, Clone)]
pub struct ReplyContext {
    pub session_id: String,
    /// The counterpart message being answered.
    pub current_text: String,
    /// Reconciled transcript, oldest first, including the current message.
    pub transcript: Vec<Message>,
    pub intelligence: ExtractedIntelligence,
    /// Logical turn count at the time of the reply.
    pub turn_index: usize,
}

/// Port for persona reply generation.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Generates the next agent reply.
    ///
    /// # Errors
    ///
    /// Any `AIError`; callers substitute [`fallback_reply`](Self::fallback_reply).
    async fn generate(&self, ctx: &ReplyContext) -> Result<String, AIError>;

    /// A static, always-available reply used when generation fails.
    fn fallback_reply(&self) -> String;
}
