//! Detected subtitles.

use serde::{Deserialize, Serialize};

/// A heading detected within a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtitle {
    /// Normalized heading text
    pub text: String,

    /// Page the heading appears on (1-indexed)
    pub page: u32,

    /// Index of the source in document order: the text block's sequence
    /// for layout headings, the bookmark's position in the flattened
    /// outline for outline headings
    pub sequence: usize,

    /// Heading level, when the source provides one
    pub level: Option<u8>,
}

impl Subtitle {
    /// Create a new subtitle.
    pub fn new(text: impl Into<String>, page: u32, sequence: usize) -> Self {
        Self {
            text: text.into(),
            page,
            sequence,
            level: None,
        }
    }

    /// Set the heading level.
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }
}
