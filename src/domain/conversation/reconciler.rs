//! History reconciliation.
//!
//! Callers resend (possibly partial, reordered, or stale) history with every
//! request, while the session separately records every turn it has seen.
//! [`reconcile`] merges both into one ordered transcript without duplicates.

use std::collections::HashSet;

use super::message::{Message, Sender, StoredTurn};

/// Outcome of merging external and internal history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Deduplicated transcript, oldest first.
    pub messages: Vec<Message>,
    /// Internal turns that could not be converted back into messages.
    pub dropped: usize,
}

type DedupeKey = (Sender, String, String);

fn dedupe_key(msg: &Message) -> DedupeKey {
    (
        msg.sender,
        msg.text.trim().to_lowercase(),
        msg.timestamp.canonical(),
    )
}

/// Merges externally supplied turns with internally recorded ones.
///
/// External turns win on an exact (sender, text, timestamp) collision.
/// The result is stable-sorted by timestamp, so turns sharing an instant keep
/// their external-then-internal insertion order.
pub fn reconcile(external: &[Message], internal: &[StoredTurn]) -> Reconciled {
    let mut seen: HashSet<DedupeKey> = HashSet::new();
    let mut messages = Vec::with_capacity(external.len() + internal.len());
    let mut dropped = 0;

    for msg in external {
        if seen.insert(dedupe_key(msg)) {
            messages.push(msg.clone());
        }
    }

    for turn in internal {
        match Message::try_from(turn) {
            Ok(msg) => {
                if seen.insert(dedupe_key(&msg)) {
                    messages.push(msg);
                }
            }
            Err(_) => dropped += 1,
        }
    }

    messages.sort_by_key(|m| m.timestamp);

    Reconciled { messages, dropped }
}
