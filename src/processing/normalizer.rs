//! Text normalization for skill matching

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static whitespace regex"));

/// The two views of a document's text that the matcher works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// Lowercased, whitespace runs collapsed to one space, trimmed
    pub normalized: String,
    /// Lowercased with every whitespace character removed
    pub compact: String,
}

impl NormalizedText {
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

pub fn normalize(text: &str) -> NormalizedText {
    let lowered = text.to_lowercase();
    let normalized = WHITESPACE.replace_all(lowered.trim(), " ").into_owned();
    let compact = WHITESPACE.replace_all(&lowered, "").into_owned();

    NormalizedText { normalized, compact }
}
