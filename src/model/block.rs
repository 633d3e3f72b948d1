//! Text block types.

use serde::{Deserialize, Serialize};

/// Position of a block on its page, in PDF user space (points, origin at the
/// bottom-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Left edge
    pub x: f32,
    /// Baseline
    pub y: f32,
}

/// One line (PDF) or block element (HTML) of text with its formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Text content
    pub text: String,

    /// Page number (1-indexed; HTML documents have a single page)
    pub page: u32,

    /// Index of the block in document order
    pub sequence: usize,

    /// Font size in points, when the source carries one
    pub font_size: Option<f32>,

    /// Whether most of the text is set in a bold weight
    pub is_bold: bool,

    /// Position on the page (PDF only)
    pub position: Option<Position>,

    /// Structural heading level (`<h1>`..`<h6>`)
    pub heading_level: Option<u8>,
}

impl TextBlock {
    /// Create a plain block with no formatting information.
    pub fn new(text: impl Into<String>, page: u32) -> Self {
        Self {
            text: text.into(),
            page,
            sequence: 0,
            font_size: None,
            is_bold: false,
            position: None,
            heading_level: None,
        }
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Set the bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.is_bold = bold;
        self
    }

    /// Set the page position.
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Some(Position { x, y });
        self
    }

    /// Set the structural heading level.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = Some(level);
        self
    }

    /// Number of characters, ignoring whitespace.
    pub fn char_count(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }

    /// Whether every letter in the block is uppercase.
    pub fn is_uppercase(&self) -> bool {
        let mut letters = self.text.chars().filter(|c| c.is_alphabetic()).peekable();
        letters.peek().is_some() && letters.all(|c| c.is_uppercase())
    }
}
