//! EngageHandler - the per-message engagement pipeline.
//!
//! Under the session lock: record the incoming turn, reconcile history,
//! score, extract, reply in persona, and hand a completion report to the
//! [`CallbackDispatcher`] once the session is done. Scoring, extraction and
//! reply failures degrade to their documented defaults; only store failures
//! abort the turn.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use super::callback_dispatcher::CallbackDispatcher;
use crate::domain::conversation::{Message, Sender};
use crate::domain::detection::ScamScorer;
use crate::domain::foundation::{DomainError, SessionId, Timestamp};
use crate::domain::intelligence::{ExtractedIntelligence, IntelligenceExtractor};
use crate::domain::session::{logical_turns, CompletionPolicy, Session};
use crate::ports::{
    CallbackOutcome, CallbackPayload, ReplyContext, ReplyGenerator, SessionStore, StoreError,
};

/// Command to process one counterpart message.
#[derive(Debug, Clone)]
pub struct EngageCommand {
    pub session_id: SessionId,
    /// The counterpart message being answered.
    pub message: Message,
    /// History resent by the caller, possibly partial or stale.
    pub history: Vec<Message>,
}

/// Result of one engagement turn.
#[derive(Debug)]
pub struct EngageResult {
    pub reply: String,
    pub scam_detected: bool,
    pub engagement_duration_secs: u64,
    pub total_messages_exchanged: u64,
    pub extracted_intelligence: ExtractedIntelligence,
    pub agent_notes: String,
    /// Background delivery started by this turn, if any.
    pub callback: Option<JoinHandle<CallbackOutcome>>,
}

/// Errors that abort an engagement turn.
#[derive(Debug, Error)]
pub enum EngageError {
    #[error("session store failed: {0}")]
    Store(#[from] StoreError),

    #[error("session state error: {0}")]
    Domain(#[from] DomainError),
}

/// Handler for incoming counterpart messages.
pub struct EngageHandler {
    store: Arc<dyn SessionStore>,
    replies: Arc<dyn ReplyGenerator>,
    dispatcher: CallbackDispatcher,
    scorer: ScamScorer,
    extractor: IntelligenceExtractor,
    completion: CompletionPolicy,
}

impl EngageHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        replies: Arc<dyn ReplyGenerator>,
        dispatcher: CallbackDispatcher,
    ) -> Self {
        Self {
            store,
            replies,
            dispatcher,
            scorer: ScamScorer::new(),
            extractor: IntelligenceExtractor::new(),
            completion: CompletionPolicy::default(),
        }
    }

    pub fn with_scorer(mut self, scorer: ScamScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_extractor(mut self, extractor: IntelligenceExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_completion_policy(mut self, policy: CompletionPolicy) -> Self {
        self.completion = policy;
        self
    }

    /// A static persona line for responses that cannot run the pipeline.
    pub fn fallback_reply(&self) -> String {
        self.replies.fallback_reply()
    }

    pub async fn handle(&self, cmd: EngageCommand) -> Result<EngageResult, EngageError> {
        let id = cmd.session_id.clone();
        let _guard = self.store.lock(&id).await;

        // 1. Record the incoming turn
        let mut session = self.store.load_or_create(&id, Timestamp::now()).await?;
        session.record_turn(&cmd.message);
        self.store.save(&session).await?;

        // 2. Reconcile history
        let mut transcript = self.transcript(&id, &cmd.history).await?;

        // 3. Detection (write-once)
        if !session.scam_detected() {
            self.detect(&mut session, &cmd.message.text, &transcript);
        }

        // 4. Extraction
        self.extract(&mut session, &transcript);

        // 5. Persona reply
        let reply = if session.scam_detected() {
            let reply = self.reply(&session, &cmd.message, &transcript).await;
            session.record_turn(&Message::agent(reply.clone(), Timestamp::now()));
            self.store.save(&session).await?;
            transcript = self.transcript(&id, &cmd.history).await?;
            session.set_agent_notes(agent_notes(session.extracted_intelligence(), &reply));
            reply
        } else {
            self.replies.fallback_reply()
        };

        // 6. Completion
        let now = Timestamp::now();
        let callback = self.maybe_complete(&mut session, &transcript, now)?;

        // 7. Persist, then start delivery
        self.store.save(&session).await?;
        let callback = callback.map(|payload| self.dispatcher.dispatch(id.clone(), payload));

        Ok(EngageResult {
            reply,
            scam_detected: session.scam_detected(),
            engagement_duration_secs: session.engagement_duration_secs(now),
            total_messages_exchanged: session.total_messages_exchanged(),
            extracted_intelligence: session.extracted_intelligence().clone(),
            agent_notes: session.agent_notes().to_string(),
            callback,
        })
    }

    async fn transcript(&self, id: &SessionId, external: &[Message]) -> Result<Vec<Message>, StoreError> {
        let reconciled = self.store.combined_history(id, external).await?;
        if reconciled.dropped > 0 {
            tracing::warn!(
                session_id = %id,
                dropped = reconciled.dropped,
                "Dropped unparseable internal turns"
            );
        }
        Ok(reconciled.messages)
    }

    fn detect(&self, session: &mut Session, current: &str, transcript: &[Message]) {
        let history = transcript
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        match self.scorer.try_check(current, &history) {
            Ok(detection) if detection.is_scam => {
                if session.mark_scam_detected() {
                    tracing::info!(
                        session_id = %session.id(),
                        confidence = detection.confidence,
                        "Scam detected"
                    );
                }
            }
            Ok(detection) => tracing::debug!(
                session_id = %session.id(),
                confidence = detection.confidence,
                "Message scored below threshold"
            ),
            Err(e) => tracing::warn!(
                session_id = %session.id(),
                "Scam scoring skipped: {}",
                e
            ),
        }
    }

    fn extract(&self, session: &mut Session, transcript: &[Message]) {
        match self.extractor.try_extract_from_messages(transcript) {
            Ok(found) => {
                let delta = session.merge_intelligence(&found);
                if delta.total() > 0 {
                    tracing::info!(
                        session_id = %session.id(),
                        bank_accounts = delta.bank_accounts,
                        upi_ids = delta.upi_ids,
                        phishing_links = delta.phishing_links,
                        phone_numbers = delta.phone_numbers,
                        suspicious_keywords = delta.suspicious_keywords,
                        "New intelligence extracted"
                    );
                }
            }
            Err(e) => tracing::warn!(
                session_id = %session.id(),
                "Extraction skipped: {}",
                e
            ),
        }
    }

    async fn reply(&self, session: &Session, message: &Message, transcript: &[Message]) -> String {
        let ctx = ReplyContext {
            session_id: session.id().to_string(),
            current_text: message.text.clone(),
            transcript: transcript.to_vec(),
            intelligence: session.extracted_intelligence().clone(),
            turn_index: logical_turns(transcript),
        };

        match self.replies.generate(&ctx).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(session_id = %session.id(), "Using fallback reply: {}", e);
                self.replies.fallback_reply()
            }
        }
    }

    /// Claims the callback slot when the session is complete.
    fn maybe_complete(
        &self,
        session: &mut Session,
        transcript: &[Message],
        now: Timestamp,
    ) -> Result<Option<CallbackPayload>, DomainError> {
        if !session.can_dispatch_callback(now) {
            return Ok(None);
        }

        let reason = self.completion.evaluate(
            session.scam_detected(),
            session.extracted_intelligence(),
            transcript,
            session.engagement_duration_secs(now),
        );
        let Some(reason) = reason else {
            return Ok(None);
        };

        session.begin_callback(now)?;
        tracing::info!(
            session_id = %session.id(),
            reason = ?reason,
            counterpart_turns = transcript.iter().filter(|m| m.is_from(Sender::Counterpart)).count(),
            "Engagement complete, dispatching callback"
        );
        Ok(Some(CallbackPayload::from_session(session)))
    }
}

/// Notes reported upstream alongside the intelligence.
fn agent_notes(intel: &ExtractedIntelligence, reply: &str) -> String {
    let mut notes = String::from("Scam detected.");
    if intel.has_high_value() {
        notes.push_str(" High-value intelligence extracted.");
    }
    format!("{} | nextReply: {}", notes, reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, PersonaReplyGenerator, FALLBACK_REPLIES};
    use crate::adapters::callback::RecordingCallbackSender;
    use crate::adapters::memory::InMemorySessionStore;
    use std::collections::BTreeSet;

    struct Fixture {
        store: InMemorySessionStore,
        sender: RecordingCallbackSender,
        handler: EngageHandler,
    }

    fn fixture(provider: Option<MockAIProvider>) -> Fixture {
        let store = InMemorySessionStore::new();
        let sender = RecordingCallbackSender::new();
        let replies = PersonaReplyGenerator::new(
            provider.map(|p| Arc::new(p) as Arc<dyn crate::ports::AIProvider>),
        );
        let dispatcher = CallbackDispatcher::new(Arc::new(store.clone()), Arc::new(sender.clone()));
        let handler = EngageHandler::new(Arc::new(store.clone()), Arc::new(replies), dispatcher);
        Fixture {
            store,
            sender,
            handler,
        }
    }

    fn sid() -> SessionId {
        SessionId::new("engage-1").unwrap()
    }

    fn cmd(text: &str) -> EngageCommand {
        EngageCommand {
            session_id: sid(),
            message: Message::counterpart(text, Timestamp::now()),
            history: Vec::new(),
        }
    }

    #[tokio::test]
    async fn benign_message_gets_fallback_and_no_agent_turn() {
        let f = fixture(None);

        let result = f.handler.handle(cmd("Hi, is the meeting still on?")).await.unwrap();

        assert!(!result.scam_detected);
        assert_eq!(result.total_messages_exchanged, 1);
        assert!(FALLBACK_REPLIES.contains(&result.reply.as_str()));
        assert!(result.agent_notes.is_empty());
        assert!(result.callback.is_none());
    }

    #[tokio::test]
    async fn scam_message_is_detected_and_answered() {
        let f = fixture(Some(MockAIProvider::new().with_response("Arre, which OTP sir?")));

        let result = f
            .handler
            .handle(cmd("Your o.t.p is 1234. Please verify! Urgent!"))
            .await
            .unwrap();

        assert!(result.scam_detected);
        assert_eq!(result.reply, "Arre, which OTP sir?");
        assert_eq!(result.total_messages_exchanged, 2);
        assert_eq!(
            result.agent_notes,
            "Scam detected. | nextReply: Arre, which OTP sir?"
        );

        let session = f.store.load(&sid()).await.unwrap().unwrap();
        assert_eq!(session.internal_history().len(), 2);
        assert_eq!(session.internal_history()[1].sender, "user");
    }

    #[tokio::test]
    async fn provider_failure_falls_back_but_still_records_reply() {
        let f = fixture(None);

        let result = f
            .handler
            .handle(cmd("URGENT: account blocked, send otp to verify"))
            .await
            .unwrap();

        assert!(result.scam_detected);
        assert!(FALLBACK_REPLIES.contains(&result.reply.as_str()));
        assert_eq!(result.total_messages_exchanged, 2);
    }

    #[tokio::test]
    async fn intelligence_accumulates_across_turns() {
        let f = fixture(None);

        f.handler
            .handle(cmd("Urgent! verify KYC, pay to fraud@ybl"))
            .await
            .unwrap();
        let result = f.handler.handle(cmd("or call 9876543210")).await.unwrap();

        assert_eq!(
            result.extracted_intelligence.upi_ids,
            BTreeSet::from(["fraud@ybl".to_string()])
        );
        assert!(result
            .extracted_intelligence
            .phone_numbers
            .contains("+919876543210"));
        assert!(result.agent_notes.contains("High-value intelligence extracted."));
    }

    #[tokio::test]
    async fn store_failure_aborts_turn() {
        let f = fixture(None);
        f.store.fail_next_saves(1);

        let result = f.handler.handle(cmd("hello")).await;

        assert!(matches!(result, Err(EngageError::Store(_))));
    }

    #[tokio::test]
    async fn completion_dispatches_once() {
        let f = fixture(None);
        let texts = [
            "Urgent: your account is blocked, verify now",
            "Pay the fee to fraud@ybl immediately",
            "Did you pay? Urgent",
            "Send now or account suspended",
        ];

        let mut dispatched = 0;
        for text in texts {
            let result = f.handler.handle(cmd(text)).await.unwrap();
            if let Some(handle) = result.callback {
                handle.await.unwrap();
                dispatched += 1;
            }
        }

        assert_eq!(dispatched, 1);
        assert_eq!(f.sender.call_count(), 1);
        let session = f.store.load(&sid()).await.unwrap().unwrap();
        assert!(session.callback_sent());

        let after = f.handler.handle(cmd("hello? still there?")).await.unwrap();
        assert!(after.callback.is_none());
        assert_eq!(f.sender.call_count(), 1);
    }

    #[test]
    fn agent_notes_flag_high_value() {
        let intel = ExtractedIntelligence {
            phishing_links: BTreeSet::from(["https://bit.ly/x".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            agent_notes(&intel, "ok"),
            "Scam detected. High-value intelligence extracted. | nextReply: ok"
        );
    }
}
