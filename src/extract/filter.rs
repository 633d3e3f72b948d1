//! Candidate filtering and text normalization.

use std::collections::HashSet;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::options::ExtractOptions;

/// Why a candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    PageNumber,
    TooLong,
    Excluded,
    Lowercase,
}

/// Filters heading candidates into final subtitles.
pub struct SubtitleFilter {
    page_number: Regex,
    numbering: Regex,
    exclusions: HashSet<String>,
    max_length: usize,
    require_capitalized: bool,
}

impl SubtitleFilter {
    /// Create a filter for the given options.
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            page_number: Regex::new(
                r"(?i)^(?:-\s*\d+\s*-|\d+|(?:p[áa]g(?:ina)?\.?|page)\s*\d+(?:\s*(?:de|of|/)\s*\d+)?)$",
            )
            .unwrap(),
            numbering: Regex::new(r"^(?:\d+(?:\.\d+)*[.)\-]?|[IVXLCDM]+[.)\-]|[a-zA-Z][.)])\s*")
                .unwrap(),
            exclusions: options
                .exclusions
                .iter()
                .map(|e| fold(&normalize(e)))
                .collect(),
            max_length: options.max_length,
            require_capitalized: options.require_capitalized,
        }
    }

    /// Normalize a candidate and check it, returning the text to keep.
    pub fn check(&self, raw: &str) -> Result<String, Rejection> {
        let text = normalize(raw);

        if text.is_empty() {
            return Err(Rejection::Empty);
        }
        if self.page_number.is_match(&text) {
            return Err(Rejection::PageNumber);
        }
        if text.chars().count() > self.max_length {
            return Err(Rejection::TooLong);
        }
        if self.exclusions.contains(&fold(&text)) {
            return Err(Rejection::Excluded);
        }
        if self.require_capitalized && !self.starts_capitalized(&text) {
            return Err(Rejection::Lowercase);
        }

        Ok(text)
    }

    /// First character after any numbering marker is an uppercase letter.
    fn starts_capitalized(&self, text: &str) -> bool {
        let rest = self.numbering.replace(text, "");
        rest.chars().next().is_some_and(char::is_uppercase)
    }
}

/// Unicode NFC, collapsed whitespace, trimmed.
pub fn normalize(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Key used for case-insensitive comparisons.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Tracks subtitles already emitted.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    /// Record a subtitle, returning `false` if it was already seen.
    pub fn insert(&mut self, text: &str) -> bool {
        self.seen.insert(fold(text))
    }
}
