//! Conversation module - turns and transcript reconciliation.

mod message;
mod reconciler;

pub use message::{transcript_text, Message, Sender, StoredTurn};
pub use reconciler::{reconcile, Reconciled};
