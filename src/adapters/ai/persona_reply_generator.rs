//! Persona Reply Generator - the honeypot's "confused victim" voice.
//!
//! Builds the persona system prompt, maps the transcript onto chat roles,
//! and calls the configured [`AIProvider`] under a hard timeout. Without a
//! provider every call fails with `NotConfigured` so callers use the
//! fallback lines.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use uuid::Uuid;

use crate::domain::conversation::Sender;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, MessageRole, ReplyContext, ReplyGenerator,
    RequestMetadata,
};

const PERSONA_PROMPT: &str = "\
You are a naive but curious potential victim.
Your goal is to waste the scammer's time and subtly extract their payment details (UPI, Bank Account) or phishing links.
DO NOT reveal that you know it is a scam. Act confused, eager, or worried.
Use Indian English or casual Hinglish. Keep replies short (1-3 lines).

Strategy:
1) First respond worried/confused about the issue (e.g., \"bank blocked?\").
2) Then ask for \"UPI id / link\" because \"my app is asking for it\".
3) If scammer asks for OTP, delay using excuses (server down, battery low).
4) After 2 failures to get details, switch tactic: \"Send payment request link / QR / account number\".

Context:
- You are a middle-aged non-tech-savvy person.
- You have some money but \"server is down\" or \"otp not coming\".";

const PUSH_FOR_DETAILS: &str = "IMPORTANT: You have not got payment details yet. Push for ONE concrete detail: ask for 'payment link', 'QR code', or 'bank account number' now. Avoid repeating the same request.";

/// Logical turn from which the prompt pushes for a payment detail.
const PUSH_AFTER_TURNS: usize = 2;

/// Confused-victim lines used whenever generation is unavailable.
pub const FALLBACK_REPLIES: &[&str] = &[
    "Hello? I am not understanding properly. Can you explain correctly?",
    "My internet is slow, message is not loading fully. Please wait.",
    "Ok checking one minute...",
    "Where to click? I am confused.",
    "Sir, my son is calling, I will reply in 5 mins.",
    "Payment is failing repeatedly. What is UPI ID properly?",
    "Bank server down I think. Do you have other account?",
];

/// LLM-backed persona reply generator.
#[derive(Clone)]
pub struct PersonaReplyGenerator {
    provider: Option<Arc<dyn AIProvider>>,
    timeout: Duration,
    max_reply_chars: usize,
    max_tokens: u32,
    temperature: f32,
}

impl Default for PersonaReplyGenerator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PersonaReplyGenerator {
    pub fn new(provider: Option<Arc<dyn AIProvider>>) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(8),
            max_reply_chars: 500,
            max_tokens: 150,
            temperature: 0.7,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_reply_chars(mut self, max: usize) -> Self {
        self.max_reply_chars = max;
        self
    }

    /// System prompt for the given context.
    pub fn system_prompt(ctx: &ReplyContext) -> String {
        if ctx.turn_index >= PUSH_AFTER_TURNS && !ctx.intelligence.has_high_value() {
            format!("{}\n{}", PERSONA_PROMPT, PUSH_FOR_DETAILS)
        } else {
            PERSONA_PROMPT.to_string()
        }
    }

    fn build_request(&self, ctx: &ReplyContext) -> CompletionRequest {
        let metadata = RequestMetadata::new(ctx.session_id.clone(), Uuid::new_v4().to_string());
        let mut request = CompletionRequest::new(metadata)
            .with_system_prompt(Self::system_prompt(ctx))
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        for msg in &ctx.transcript {
            let role = match msg.sender {
                Sender::Agent => MessageRole::Assistant,
                Sender::Counterpart => MessageRole::User,
            };
            request = request.with_message(role, msg.text.clone());
        }

        let current = ctx.current_text.trim().to_lowercase();
        let already_last = request.messages.last().is_some_and(|m| {
            m.role == MessageRole::User && m.content.trim().to_lowercase() == current
        });
        if !already_last {
            request = request.with_message(MessageRole::User, ctx.current_text.clone());
        }

        request
    }
}

/// Trims and caps a reply at `max_chars`, ending in "..." when cut.
pub fn truncate_reply(reply: &str, max_chars: usize) -> String {
    let reply = reply.trim();
    if reply.chars().count() <= max_chars {
        return reply.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut cut: String = reply.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

#[async_trait]
impl ReplyGenerator for PersonaReplyGenerator {
    async fn generate(&self, ctx: &ReplyContext) -> Result<String, AIError> {
        let provider = self.provider.as_ref().ok_or(AIError::NotConfigured)?;
        let request = self.build_request(ctx);

        let response = timeout(self.timeout, provider.complete(request))
            .await
            .map_err(|_| AIError::Timeout {
                timeout_secs: self.timeout.as_secs() as u32,
            })??;

        let reply = truncate_reply(&response.content, self.max_reply_chars);
        if reply.is_empty() {
            return Err(AIError::EmptyReply);
        }
        Ok(reply)
    }

    fn fallback_reply(&self) -> String {
        FALLBACK_REPLIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(FALLBACK_REPLIES[0])
            .to_string()
    }
}
