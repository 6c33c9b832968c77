//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `conversation` - Turns and history reconciliation
//! - `intelligence` - Entity extraction and accumulated findings
//! - `detection` - Lexical scam-likelihood scoring
//! - `session` - Engagement session lifecycle and completion rules

pub mod conversation;
pub mod detection;
pub mod foundation;
pub mod intelligence;
pub mod session;
