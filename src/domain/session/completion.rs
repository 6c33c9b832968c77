//! Completion criteria and callback retry policy.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::{Message, Sender};
use crate::domain::intelligence::ExtractedIntelligence;

/// Pairs counterpart turns with agent replies.
///
/// `min(counterpart, agent + 1)`: a counterpart message the agent has not yet
/// answered still counts, but extra unanswered ones do not.
pub fn logical_turns(transcript: &[Message]) -> usize {
    let counterpart = transcript
        .iter()
        .filter(|m| m.is_from(Sender::Counterpart))
        .count();
    let agent = transcript.len() - counterpart;
    counterpart.min(agent + 1)
}

/// Why a session was judged complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// High-value intelligence after enough turns.
    IntelligenceGathered,
    /// Turn cap reached regardless of yield.
    TurnLimit,
    /// Wall-clock cap reached.
    DurationLimit,
}

/// Thresholds that end an engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionPolicy {
    pub min_turns_with_intel: usize,
    pub max_turns: usize,
    pub max_duration_secs: u64,
}

impl Default for CompletionPolicy {
    fn default() -> Self {
        Self {
            min_turns_with_intel: 4,
            max_turns: 8,
            max_duration_secs: 300,
        }
    }
}

impl CompletionPolicy {
    /// Evaluates the completion criteria.
    ///
    /// Returns `None` unless a scam was detected and at least one criterion
    /// holds. Criteria are checked in order: intelligence, turns, duration.
    pub fn evaluate(
        &self,
        scam_detected: bool,
        intel: &ExtractedIntelligence,
        transcript: &[Message],
        elapsed_secs: u64,
    ) -> Option<CompletionReason> {
        if !scam_detected {
            return None;
        }

        let turns = logical_turns(transcript);
        if intel.has_high_value() && turns >= self.min_turns_with_intel {
            Some(CompletionReason::IntelligenceGathered)
        } else if turns >= self.max_turns {
            Some(CompletionReason::TurnLimit)
        } else if elapsed_secs >= self.max_duration_secs {
            Some(CompletionReason::DurationLimit)
        } else {
            None
        }
    }
}

/// Cool-down applied after repeated callback failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Failed attempts before the cool-down window kicks in.
    pub cooldown_after_failures: u32,
    pub cooldown_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            cooldown_after_failures: 3,
            cooldown_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use std::collections::BTreeSet;

    fn transcript(counterpart: usize, agent: usize) -> Vec<Message> {
        let ts = Timestamp::now();
        let mut messages = Vec::new();
        for i in 0..counterpart.max(agent) {
            if i < counterpart {
                messages.push(Message::counterpart(format!("c{}", i), ts));
            }
            if i < agent {
                messages.push(Message::agent(format!("a{}", i), ts));
            }
        }
        messages
    }

    fn with_upi() -> ExtractedIntelligence {
        ExtractedIntelligence {
            upi_ids: BTreeSet::from(["thief@ybl".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn logical_turns_pairs_messages() {
        assert_eq!(logical_turns(&transcript(0, 0)), 0);
        assert_eq!(logical_turns(&transcript(1, 0)), 1);
        assert_eq!(logical_turns(&transcript(3, 0)), 1);
        assert_eq!(logical_turns(&transcript(2, 2)), 2);
        assert_eq!(logical_turns(&transcript(4, 3)), 4);
    }

    #[test]
    fn two_turns_with_intel_is_not_complete() {
        let policy = CompletionPolicy::default();
        assert_eq!(policy.evaluate(true, &with_upi(), &transcript(2, 2), 10), None);
    }

    #[test]
    fn four_turns_with_intel_completes() {
        let policy = CompletionPolicy::default();
        assert_eq!(
            policy.evaluate(true, &with_upi(), &transcript(4, 3), 10),
            Some(CompletionReason::IntelligenceGathered)
        );
    }

    #[test]
    fn turn_cap_completes_without_intel() {
        let policy = CompletionPolicy::default();
        assert_eq!(
            policy.evaluate(true, &ExtractedIntelligence::default(), &transcript(8, 8), 10),
            Some(CompletionReason::TurnLimit)
        );
    }

    #[test]
    fn duration_cap_completes() {
        let policy = CompletionPolicy::default();
        assert_eq!(
            policy.evaluate(true, &ExtractedIntelligence::default(), &transcript(1, 0), 300),
            Some(CompletionReason::DurationLimit)
        );
    }

    #[test]
    fn nothing_completes_without_detection() {
        let policy = CompletionPolicy::default();
        assert_eq!(policy.evaluate(false, &with_upi(), &transcript(9, 9), 900), None);
    }

    #[test]
    fn phones_alone_are_not_high_value() {
        let policy = CompletionPolicy::default();
        let intel = ExtractedIntelligence {
            phone_numbers: BTreeSet::from(["+919876543210".to_string()]),
            ..Default::default()
        };
        assert_eq!(policy.evaluate(true, &intel, &transcript(5, 4), 10), None);
    }
}
