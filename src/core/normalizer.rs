//! String normalization for fuzzy catalog comparison
//!
//! Normalized keys are only ever compared, never displayed or persisted.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").expect("static pattern");
}

/// Canonicalize text for comparison
///
/// Lowercases, drops every character that is neither a word character nor
/// whitespace, collapses whitespace runs to a single space and trims.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Same as [`normalize`], treating a missing value as empty
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Remove punctuation only, keeping case and spacing intact
pub fn strip_punctuation(text: &str) -> String {
    NON_WORD.replace_all(text, "").into_owned()
}
