//! Accumulated intelligence for a session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Five categories of intelligence harvested from a conversation.
///
/// # Invariants
///
/// - Each category is a set: values are unique after normalization
/// - Merging is union-only, so categories never shrink
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedIntelligence {
    #[serde(default)]
    pub bank_accounts: BTreeSet<String>,
    #[serde(default)]
    pub upi_ids: BTreeSet<String>,
    #[serde(default)]
    pub phishing_links: BTreeSet<String>,
    #[serde(default)]
    pub phone_numbers: BTreeSet<String>,
    #[serde(default)]
    pub suspicious_keywords: BTreeSet<String>,
}

/// Number of new values each category gained in a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeDelta {
    pub bank_accounts: usize,
    pub upi_ids: usize,
    pub phishing_links: usize,
    pub phone_numbers: usize,
    pub suspicious_keywords: usize,
}

impl MergeDelta {
    /// Total number of values added across all categories.
    pub fn total(&self) -> usize {
        self.bank_accounts
            + self.upi_ids
            + self.phishing_links
            + self.phone_numbers
            + self.suspicious_keywords
    }
}

fn union_into(target: &mut BTreeSet<String>, source: &BTreeSet<String>) -> usize {
    let before = target.len();
    target.extend(source.iter().cloned());
    target.len() - before
}

impl ExtractedIntelligence {
    /// Unions `other` into `self`, returning how much each category grew.
    pub fn merge(&mut self, other: &ExtractedIntelligence) -> MergeDelta {
        MergeDelta {
            bank_accounts: union_into(&mut self.bank_accounts, &other.bank_accounts),
            upi_ids: union_into(&mut self.upi_ids, &other.upi_ids),
            phishing_links: union_into(&mut self.phishing_links, &other.phishing_links),
            phone_numbers: union_into(&mut self.phone_numbers, &other.phone_numbers),
            suspicious_keywords: union_into(
                &mut self.suspicious_keywords,
                &other.suspicious_keywords,
            ),
        }
    }

    /// True when a bank account, UPI handle, or phishing link is present.
    pub fn has_high_value(&self) -> bool {
        !self.bank_accounts.is_empty()
            || !self.upi_ids.is_empty()
            || !self.phishing_links.is_empty()
    }

    /// True when every category is empty.
    pub fn is_empty(&self) -> bool {
        !self.has_high_value()
            && self.phone_numbers.is_empty()
            && self.suspicious_keywords.is_empty()
    }

    /// Category sizes in a fixed order: bank, upi, links, phones, keywords.
    pub fn sizes(&self) -> [usize; 5] {
        [
            self.bank_accounts.len(),
            self.upi_ids.len(),
            self.phishing_links.len(),
            self.phone_numbers.len(),
            self.suspicious_keywords.len(),
        ]
    }
}
