//! Body text baseline.

use std::collections::HashMap;

use crate::model::TextBlock;

/// Body size assumed when a document carries no size information.
const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Font statistics for heading detection.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Body text font size (most common by characters)
    pub body_size: f32,
    /// Whether most body characters are bold
    pub body_bold: bool,
    /// Characters per font size, in tenths of a point
    pub size_histogram: HashMap<i32, usize>,
    bold_chars: usize,
    total_chars: usize,
}

impl FontStatistics {
    /// Build statistics over every block of a document.
    pub fn from_blocks<'a>(blocks: impl IntoIterator<Item = &'a TextBlock>) -> Self {
        let mut stats = Self::default();
        for block in blocks {
            stats.add_block(block);
        }
        stats.analyze();
        stats
    }

    /// Add one block, weighted by its character count.
    pub fn add_block(&mut self, block: &TextBlock) {
        let chars = block.char_count();
        if chars == 0 {
            return;
        }
        self.total_chars += chars;
        if block.is_bold {
            self.bold_chars += chars;
        }
        if let Some(size) = block.font_size {
            let key = (size * 10.0).round() as i32;
            *self.size_histogram.entry(key).or_insert(0) += chars;
        }
    }

    /// Derive the body size and weight.
    pub fn analyze(&mut self) {
        self.body_bold = self.bold_chars * 2 > self.total_chars;

        // Highest count wins, smaller size on ties
        self.body_size = self
            .size_histogram
            .iter()
            .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
            .map(|(key, _)| *key as f32 / 10.0)
            .unwrap_or(DEFAULT_BODY_SIZE);
    }

    /// Check whether a size reads as larger than body text.
    pub fn is_heading_size(&self, font_size: f32, delta: f32) -> bool {
        // Compare in tenths to absorb float noise
        (font_size * 10.0).round() >= ((self.body_size + delta) * 10.0).round()
    }

    /// Whether any block reported a font size.
    pub fn has_sizes(&self) -> bool {
        !self.size_histogram.is_empty()
    }
}
