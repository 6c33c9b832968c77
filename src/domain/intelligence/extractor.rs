//! Entity extraction from free text.
//!
//! Scans counterpart text for payment handles, bank accounts, phone numbers,
//! phishing links, and scam vocabulary. Every category extractor is total:
//! any input, including the empty string, yields a (possibly empty) set.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use thiserror::Error;

use super::collected::ExtractedIntelligence;
use crate::domain::conversation::{transcript_text, Message};

/// Largest text (in bytes) the extractor will scan in one call.
pub const MAX_SCAN_BYTES: usize = 256 * 1024;

/// Leading domain labels of generic email providers, never UPI handles.
pub const EMAIL_PROVIDERS: &[&str] = &[
    "gmail",
    "yahoo",
    "outlook",
    "hotmail",
    "icloud",
    "protonmail",
    "zoho",
    "yandex",
    "live",
    "rediffmail",
    "aol",
    "mail",
];

/// Payment-service-provider handle suffixes.
pub const PSP_SUFFIXES: &[&str] = &[
    "ybl",
    "okaxis",
    "okhdfcbank",
    "okicici",
    "paytm",
    "axl",
    "sbi",
    "icici",
    "hdfc",
    "kotak",
    "upi",
    "apl",
    "ibl",
    "airtel",
    "jio",
];

/// Scam-indicative terms reported as suspicious keywords.
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "urgent",
    "verify",
    "blocked",
    "kyc",
    "otp",
    "refund",
    "reward",
    "winner",
    "lottery",
    "click here",
    "update pan",
    "suspend",
    "electricity",
    "disconnect",
    "prize",
    "gift",
    "loan",
    "investment",
];

/// Bare-domain URL shorteners recognised without a protocol.
pub const URL_SHORTENERS: &[&str] = &["bit.ly", "tinyurl.com", "t.co", "rb.gy"];

const MAX_BANK_STYLE_SUFFIX: usize = 12;

const URL_TRAILING_PUNCTUATION: &[char] = &[')', '.', ',', ';', '!', '?', '"', '\''];

static UPI_CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]{2,}").expect("upi pattern"));

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{9,18}\b").expect("digit pattern"));

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\+?91[\-\s]?)?[6-9]\d{9}\b").expect("phone pattern"));

static PROTOCOL_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("url pattern"));

static SHORTENER_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:bit\.ly|tinyurl\.com|t\.co|rb\.gy)/[a-zA-Z0-9_-]+")
        .expect("shortener pattern")
});

/// Errors that can occur during extraction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Input too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },
}

/// Stateless extractor for payment and contact intelligence.
#[derive(Debug, Clone)]
pub struct IntelligenceExtractor {
    max_scan_bytes: usize,
}

impl Default for IntelligenceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl IntelligenceExtractor {
    pub fn new() -> Self {
        Self {
            max_scan_bytes: MAX_SCAN_BYTES,
        }
    }

    /// Overrides the scan size limit.
    pub fn with_max_scan_bytes(mut self, max: usize) -> Self {
        self.max_scan_bytes = max;
        self
    }

    /// Runs all five extractors over one text block.
    pub fn extract_from_text(&self, text: &str) -> ExtractedIntelligence {
        ExtractedIntelligence {
            bank_accounts: self.extract_bank_accounts(text),
            upi_ids: self.extract_upi(text),
            phishing_links: self.extract_urls(text),
            phone_numbers: self.extract_phone_numbers(text),
            suspicious_keywords: self.extract_keywords(text),
        }
    }

    /// Runs all five extractors over the space-joined text of `messages`.
    pub fn extract_from_messages(&self, messages: &[Message]) -> ExtractedIntelligence {
        self.extract_from_text(&transcript_text(messages))
    }

    /// Bounded variant of [`extract_from_messages`](Self::extract_from_messages).
    ///
    /// # Errors
    ///
    /// - `TooLong` when the joined transcript exceeds the scan limit
    pub fn try_extract_from_messages(
        &self,
        messages: &[Message],
    ) -> Result<ExtractedIntelligence, ExtractionError> {
        let text = transcript_text(messages);
        if text.len() > self.max_scan_bytes {
            return Err(ExtractionError::TooLong {
                max: self.max_scan_bytes,
                actual: text.len(),
            });
        }
        Ok(self.extract_from_text(&text))
    }

    /// Finds `name@provider` payment handles, lower-cased.
    ///
    /// Email addresses at generic providers are rejected. A handle is kept
    /// when its domain is a known PSP suffix or a short dotless bank-style
    /// suffix.
    pub fn extract_upi(&self, text: &str) -> BTreeSet<String> {
        UPI_CANDIDATE
            .find_iter(text)
            .filter_map(|m| {
                let candidate = m
                    .as_str()
                    .trim()
                    .to_lowercase()
                    .trim_end_matches(['.', '-'])
                    .to_string();
                let (_, domain) = candidate.split_once('@')?;
                if domain.is_empty() {
                    return None;
                }
                let primary = domain.split('.').next().unwrap_or(domain);
                if EMAIL_PROVIDERS.contains(&primary) {
                    return None;
                }
                let is_psp = PSP_SUFFIXES.contains(&domain);
                let is_bank_style =
                    !domain.contains('.') && domain.chars().count() <= MAX_BANK_STYLE_SUFFIX;
                (is_psp || is_bank_style).then_some(candidate)
            })
            .collect()
    }

    /// Finds 9-18 digit runs that are not shaped like an Indian mobile number.
    ///
    /// A run of exactly ten digits starting with 6-9 is never reported, since
    /// it is indistinguishable from a phone number.
    pub fn extract_bank_accounts(&self, text: &str) -> BTreeSet<String> {
        DIGIT_RUN
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|run| !is_mobile_shaped(run))
            .map(str::to_string)
            .collect()
    }

    /// Finds Indian mobile numbers and normalizes them to `+91XXXXXXXXXX`.
    pub fn extract_phone_numbers(&self, text: &str) -> BTreeSet<String> {
        PHONE
            .find_iter(text)
            .map(|m| normalize_phone(m.as_str()))
            .collect()
    }

    /// Finds protocol URLs and bare shortener links.
    ///
    /// Trailing sentence punctuation is stripped; shortener links without a
    /// protocol get an `https://` prefix. Case is preserved.
    pub fn extract_urls(&self, text: &str) -> BTreeSet<String> {
        let protocol = PROTOCOL_URL
            .find_iter(text)
            .map(|m| m.as_str().trim_end_matches(URL_TRAILING_PUNCTUATION))
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        let shortened = SHORTENER_URL.find_iter(text).map(|m| {
            format!(
                "https://{}",
                m.as_str().trim_end_matches(URL_TRAILING_PUNCTUATION)
            )
        });

        protocol.chain(shortened).collect()
    }

    /// Finds scam vocabulary by case-insensitive substring match.
    pub fn extract_keywords(&self, text: &str) -> BTreeSet<String> {
        let lowered = text.to_lowercase();
        SUSPICIOUS_KEYWORDS
            .iter()
            .filter(|kw| lowered.contains(*kw))
            .map(|kw| kw.to_string())
            .collect()
    }
}

fn is_mobile_shaped(run: &str) -> bool {
    run.chars().count() == 10 && run.starts_with(['6', '7', '8', '9'])
}

fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() > 10 && digits.starts_with("91") {
        format!("+{}", digits)
    } else if digits.len() == 10 {
        format!("+91{}", digits)
    } else {
        digits
    }
}
