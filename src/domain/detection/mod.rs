//! Detection module - lexical scam-likelihood scoring.

mod normalizer;
mod scorer;

pub use normalizer::{normalize, tokens};
pub use scorer::{
    Detection, ScamScorer, ScoringError, TextScore, BENIGN_TERMS, DEFAULT_HISTORY_MARGIN,
    DEFAULT_HISTORY_WEIGHT, DEFAULT_THRESHOLD, HIGH_RISK_TERMS, MEDIUM_RISK_TERMS,
};
