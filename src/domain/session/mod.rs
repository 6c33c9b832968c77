//! Session domain module.
//!
//! Owns the per-conversation aggregate, its derived lifecycle status, and the
//! rules that decide when an engagement is complete.
//!
//! # Lifecycle
//!
//! - `New` - no scam detected yet
//! - `Engaged` - scam detected, persona replying
//! - `Completing` - completion callback in flight
//! - `RetryWait` - last callback failed
//! - `Completed` - callback delivered (terminal)

mod aggregate;
mod completion;
mod status;

pub use aggregate::Session;
pub use completion::{logical_turns, CompletionPolicy, CompletionReason, RetryPolicy};
pub use status::EngagementStatus;
