//! Engagement lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Where a session sits in the engagement lifecycle.
///
/// ```text
/// New ──► Engaged ──► Completing ──► Completed
///                       │    ▲
///                       ▼    │
///                     RetryWait
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStatus {
    /// No scam detected yet.
    New,
    /// Scam detected, the persona is engaging.
    Engaged,
    /// A completion callback is in flight.
    Completing,
    /// The last callback failed; another may be attempted later.
    RetryWait,
    /// The completion callback was delivered.
    Completed,
}

impl EngagementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementStatus::New => "new",
            EngagementStatus::Engaged => "engaged",
            EngagementStatus::Completing => "completing",
            EngagementStatus::RetryWait => "retry_wait",
            EngagementStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for EngagementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for EngagementStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use EngagementStatus::*;
        match self {
            New => vec![Engaged],
            Engaged => vec![Completing],
            Completing => vec![Completed, RetryWait],
            RetryWait => vec![Completing],
            Completed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_is_terminal() {
        assert!(EngagementStatus::Completed.is_terminal());
        assert!(!EngagementStatus::RetryWait.is_terminal());
    }

    #[test]
    fn new_cannot_jump_to_completing() {
        assert!(EngagementStatus::New
            .transition_to(EngagementStatus::Completing)
            .is_err());
    }

    #[test]
    fn retry_wait_can_complete_again() {
        let next = EngagementStatus::RetryWait
            .transition_to(EngagementStatus::Completing)
            .unwrap();
        assert_eq!(next, EngagementStatus::Completing);
    }

    #[test]
    fn engaged_is_irreversible() {
        assert!(!EngagementStatus::Engaged.can_transition_to(&EngagementStatus::New));
    }
}
