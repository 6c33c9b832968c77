//! Honeypot - conversational scam engagement service
//!
//! Plays a naive victim against suspected scammers, scores each turn for scam
//! likelihood, harvests payment intelligence (bank accounts, UPI handles,
//! links, phone numbers) and reports each finished engagement upstream once.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
