//! Extraction options.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Section titles shared by every PBC template, dropped by default.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "Etapas y Plazos",
    "Adjudicación y Contrato",
    "Datos del Contacto",
];

/// Options controlling subtitle detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Where subtitles come from
    pub strategy: Strategy,

    /// Points above the body size that make a line a heading
    pub size_delta: f32,

    /// Treat bold lines as headings when body text is regular
    pub detect_bold: bool,

    /// Treat all-uppercase lines as headings
    pub uppercase_as_heading: bool,

    /// Deepest structural or outline level accepted (1-based)
    pub max_level: u8,

    /// Longest subtitle kept, in characters
    pub max_length: usize,

    /// Subtitles to drop (case-insensitive, exact match)
    pub exclusions: Vec<String>,

    /// Require the first letter after any numbering to be uppercase
    pub require_capitalized: bool,

    /// Drop repeated subtitles, keeping the first occurrence
    pub deduplicate: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            size_delta: 1.5,
            detect_bold: true,
            uppercase_as_heading: false,
            max_level: 6,
            max_length: 150,
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            require_capitalized: true,
            deduplicate: false,
        }
    }
}

impl ExtractOptions {
    /// Create new extraction options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the extraction strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the font size margin over body text.
    pub fn with_size_delta(mut self, delta: f32) -> Self {
        self.size_delta = delta;
        self
    }

    /// Enable or disable the bold signal.
    pub fn with_bold_detection(mut self, enabled: bool) -> Self {
        self.detect_bold = enabled;
        self
    }

    /// Enable or disable the uppercase signal.
    pub fn with_uppercase_headings(mut self, enabled: bool) -> Self {
        self.uppercase_as_heading = enabled;
        self
    }

    /// Set the deepest heading level accepted.
    pub fn with_max_level(mut self, level: u8) -> Self {
        self.max_level = level.clamp(1, 6);
        self
    }

    /// Set the maximum subtitle length.
    pub fn with_max_length(mut self, length: usize) -> Self {
        self.max_length = length;
        self
    }

    /// Replace the exclusion list.
    pub fn with_exclusions<I, S>(mut self, exclusions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions = exclusions.into_iter().map(Into::into).collect();
        self
    }

    /// Add one subtitle to the exclusion list.
    pub fn exclude(mut self, text: impl Into<String>) -> Self {
        self.exclusions.push(text.into());
        self
    }

    /// Keep or drop subtitles starting with a lowercase letter.
    pub fn with_require_capitalized(mut self, required: bool) -> Self {
        self.require_capitalized = required;
        self
    }

    /// Enable or disable deduplication.
    pub fn with_deduplicate(mut self, enabled: bool) -> Self {
        self.deduplicate = enabled;
        self
    }
}

/// Source of subtitles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Classify lines by font size, weight and structure
    #[default]
    Layout,
    /// Use the PDF bookmark tree only
    Outline,
    /// Use bookmarks when present, layout otherwise
    PreferOutline,
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "layout" => Ok(Strategy::Layout),
            "outline" => Ok(Strategy::Outline),
            "prefer-outline" | "prefer_outline" => Ok(Strategy::PreferOutline),
            other => Err(Error::Other(format!("Unknown strategy: {}", other))),
        }
    }
}
