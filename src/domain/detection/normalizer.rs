//! Text normalization for lexical scoring.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Sensitive words commonly written with separators to dodge filters.
const OBFUSCATED_WORDS: &[&str] = &["otp", "kyc", "cvv"];

static SPREAD_WORDS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    OBFUSCATED_WORDS
        .iter()
        .map(|word| {
            let pattern = word
                .chars()
                .map(|c| regex::escape(&c.to_string()))
                .collect::<Vec<_>>()
                .join(r"[.\-_ ]*");
            (Regex::new(&pattern).expect("obfuscation pattern"), *word)
        })
        .collect()
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("word pattern"));

/// Lower-cases, folds obfuscated sensitive words and collapses whitespace.
///
/// `"Your O.T.P  is"` becomes `"your otp is"`; the digit confusable `0tp`
/// also folds to `otp`.
pub fn normalize(text: &str) -> String {
    let mut lowered = text.to_lowercase();
    for (pattern, word) in SPREAD_WORDS.iter() {
        lowered = pattern.replace_all(&lowered, *word).into_owned();
    }
    let lowered = lowered.replace("0tp", "otp");
    WHITESPACE.replace_all(&lowered, " ").trim().to_string()
}

/// Word tokens of already-normalized text.
pub fn tokens(normalized: &str) -> HashSet<&str> {
    WORD.find_iter(normalized).map(|m| m.as_str()).collect()
}
