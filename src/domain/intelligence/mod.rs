//! Intelligence module - entity extraction and accumulated findings.

mod collected;
mod extractor;

pub use collected::{ExtractedIntelligence, MergeDelta};
pub use extractor::{
    ExtractionError, IntelligenceExtractor, EMAIL_PROVIDERS, MAX_SCAN_BYTES, PSP_SUFFIXES,
    SUSPICIOUS_KEYWORDS, URL_SHORTENERS,
};
