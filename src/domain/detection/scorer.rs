//! Heuristic scam-likelihood scoring.
//!
//! A fast lexical classifier: weighted keyword hits, structural signals
//! (links, phone numbers, payment handles) and benign-token damping. It never
//! calls out to a model and is safe to run on every turn.

use thiserror::Error;

use super::normalizer::{normalize, tokens};
use crate::domain::intelligence::IntelligenceExtractor;

/// Weight of each matched high-risk term.
pub const HIGH_RISK_WEIGHT: f64 = 0.22;
/// Weight of each matched medium-risk term.
pub const MEDIUM_RISK_WEIGHT: f64 = 0.10;
/// Upper bound on the combined keyword contribution.
pub const KEYWORD_CAP: f64 = 0.70;
pub const URL_WEIGHT: f64 = 0.22;
pub const PHONE_WEIGHT: f64 = 0.15;
pub const UPI_WEIGHT: f64 = 0.18;
/// Penalty per benign term, applied only without strong evidence.
pub const BENIGN_PENALTY: f64 = 0.15;
/// Ceiling for the combined confidence.
pub const MAX_CONFIDENCE: f64 = 0.99;

pub const DEFAULT_THRESHOLD: f64 = 0.65;
pub const DEFAULT_HISTORY_WEIGHT: f64 = 0.5;
pub const DEFAULT_HISTORY_MARGIN: f64 = 0.10;

/// Largest text (in bytes) scored in one call.
pub const MAX_SCORE_BYTES: usize = 256 * 1024;

pub const HIGH_RISK_TERMS: &[&str] = &[
    "otp",
    "cvv",
    "kyc",
    "verify",
    "blocked",
    "lottery",
    "prize",
    "winner",
    "urgent",
    "urgently",
    "immediate",
    "immediately",
    "suspend",
    "suspended",
    "electricity",
    "disconnect",
    "customs",
    "gift",
    "turant",
    "jaldi",
    "abhi",
    "warna",
    "aaj",
    "band ho jayega",
    "account band",
    "freeze",
    "frozen",
    "otp bhejo",
    "otp send",
    "kyc update",
    "verify karo",
    "link kholo",
    "verify account",
    "verify your account",
    "update kyc",
    "refund",
    "cashback",
    "reward",
    "inaam",
    "collect request",
];

pub const MEDIUM_RISK_TERMS: &[&str] = &[
    "update", "pan", "aadhar", "link", "click", "manager", "bank", "account", "credit", "debit",
    "upi id", "paise",
];

pub const BENIGN_TERMS: &[&str] = &[
    "thank you",
    "ok",
    "yes",
    "no",
    "hello",
    "hi",
    "meeting",
    "project",
    "assignment",
];

/// Shortener hosts recognised by raw substring, protocol or not.
const SHORTENER_MARKERS: &[&str] = &[
    "bit.ly/",
    "tinyurl.com/",
    "t.co/",
    "rb.gy/",
    "is.gd/",
    "goo.gl/",
];

/// Errors that can occur during scoring.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("Input too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },
}

/// Score and evidence for a single block of text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextScore {
    /// Per-text score, clamped to be non-negative.
    pub score: f64,
    /// URL, phone, payment handle, or high-risk term present.
    pub strong_evidence: bool,
    /// Strong evidence or any keyword contribution.
    pub any_evidence: bool,
    pub high_risk_matches: Vec<&'static str>,
    pub medium_risk_matches: Vec<&'static str>,
    pub benign_matches: Vec<&'static str>,
    pub has_url: bool,
    pub has_phone: bool,
    pub has_upi: bool,
}

impl TextScore {
    /// True when `term` was counted as a high- or medium-risk keyword.
    pub fn matched(&self, term: &str) -> bool {
        self.high_risk_matches.contains(&term) || self.medium_risk_matches.contains(&term)
    }
}

/// Outcome of scoring a turn against its history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub is_scam: bool,
    /// Combined confidence in `[0, 0.99]`.
    pub confidence: f64,
}

/// Lexical scam scorer.
///
/// # Decision rule
///
/// `total = min(current + history_weight * history, 0.99)`. A turn is a scam
/// when the current text carries strong evidence and `total >= threshold`, or
/// when the history carries any evidence and `total >= threshold + margin`.
#[derive(Debug, Clone)]
pub struct ScamScorer {
    extractor: IntelligenceExtractor,
    threshold: f64,
    history_weight: f64,
    history_margin: f64,
    max_score_bytes: usize,
}

impl Default for ScamScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScamScorer {
    pub fn new() -> Self {
        Self {
            extractor: IntelligenceExtractor::new(),
            threshold: DEFAULT_THRESHOLD,
            history_weight: DEFAULT_HISTORY_WEIGHT,
            history_margin: DEFAULT_HISTORY_MARGIN,
            max_score_bytes: MAX_SCORE_BYTES,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_history_weight(mut self, weight: f64) -> Self {
        self.history_weight = weight;
        self
    }

    pub fn with_history_margin(mut self, margin: f64) -> Self {
        self.history_margin = margin;
        self
    }

    pub fn with_max_score_bytes(mut self, max: usize) -> Self {
        self.max_score_bytes = max;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Scores one block of text in isolation.
    pub fn calculate_text_score(&self, text: &str) -> TextScore {
        let normalized = normalize(text);
        let toks = tokens(&normalized);

        // Phrases match by containment, single words only as whole tokens.
        let hit = |term: &str| normalized.contains(term) && (term.contains(' ') || toks.contains(term));

        let high_risk_matches: Vec<&'static str> =
            HIGH_RISK_TERMS.iter().filter(|t| hit(t)).copied().collect();
        let medium_risk_matches: Vec<&'static str> =
            MEDIUM_RISK_TERMS.iter().filter(|t| hit(t)).copied().collect();

        let keyword_score = (high_risk_matches.len() as f64 * HIGH_RISK_WEIGHT
            + medium_risk_matches.len() as f64 * MEDIUM_RISK_WEIGHT)
            .min(KEYWORD_CAP);

        let has_url = !self.extractor.extract_urls(text).is_empty()
            || SHORTENER_MARKERS.iter().any(|m| normalized.contains(m));
        let has_phone = !self.extractor.extract_phone_numbers(text).is_empty();
        let has_upi = !self.extractor.extract_upi(text).is_empty();

        let mut score = keyword_score;
        if has_url {
            score += URL_WEIGHT;
        }
        if has_phone {
            score += PHONE_WEIGHT;
        }
        if has_upi {
            score += UPI_WEIGHT;
        }

        let strong_evidence = has_url || has_phone || has_upi || !high_risk_matches.is_empty();
        let any_evidence = strong_evidence || keyword_score > 0.0;

        let benign_matches: Vec<&'static str> = if strong_evidence {
            Vec::new()
        } else {
            BENIGN_TERMS
                .iter()
                .filter(|t| toks.contains(**t))
                .copied()
                .collect()
        };
        score -= benign_matches.len() as f64 * BENIGN_PENALTY;

        TextScore {
            score: score.max(0.0),
            strong_evidence,
            any_evidence,
            high_risk_matches,
            medium_risk_matches,
            benign_matches,
            has_url,
            has_phone,
            has_upi,
        }
    }

    /// Scores the current turn against the prior transcript text.
    pub fn check(&self, current: &str, history: &str) -> Detection {
        let cur = self.calculate_text_score(current);
        let hist = self.calculate_text_score(history);

        let confidence = (cur.score + self.history_weight * hist.score).min(MAX_CONFIDENCE);
        let is_scam = (cur.strong_evidence && confidence >= self.threshold)
            || (hist.any_evidence && confidence >= self.threshold + self.history_margin);

        Detection {
            is_scam,
            confidence,
        }
    }

    /// Bounded variant of [`check`](Self::check).
    ///
    /// # Errors
    ///
    /// - `TooLong` when either input exceeds the scoring limit
    pub fn try_check(&self, current: &str, history: &str) -> Result<Detection, ScoringError> {
        let actual = current.len().max(history.len());
        if actual > self.max_score_bytes {
            return Err(ScoringError::TooLong {
                max: self.max_score_bytes,
                actual,
            });
        }
        Ok(self.check(current, history))
    }
}
