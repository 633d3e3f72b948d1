//! Document-level types.

use super::TextBlock;
use crate::detect::SourceFormat;
use serde::{Deserialize, Serialize};

/// A loaded PDF or HTML document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (format, title, etc.)
    pub metadata: Metadata,

    /// Text blocks in document order
    pub blocks: Vec<TextBlock>,

    /// Document outline (PDF bookmarks)
    pub outline: Option<Outline>,
}

impl Document {
    /// Create a new empty document of the given format.
    pub fn new(format: SourceFormat) -> Self {
        Self {
            metadata: Metadata::new(format),
            blocks: Vec::new(),
            outline: None,
        }
    }

    /// Append a block, assigning it the next sequence number.
    pub fn push_block(&mut self, mut block: TextBlock) {
        block.sequence = self.blocks.len();
        self.blocks.push(block);
    }

    /// Get the number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has any text.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Check if the document carries a non-empty outline.
    pub fn has_outline(&self) -> bool {
        self.outline.as_ref().is_some_and(|o| !o.is_empty())
    }

    /// Get plain text content of the entire document, one block per line.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Document metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Source format
    pub format: SourceFormat,

    /// Document title (PDF Info dictionary or HTML `<title>`)
    pub title: Option<String>,

    /// PDF version (e.g., "1.7"), empty for HTML
    pub pdf_version: String,

    /// Total number of pages in the source
    pub page_count: u32,
}

impl Metadata {
    /// Create metadata for a format.
    pub fn new(format: SourceFormat) -> Self {
        Self {
            format,
            title: None,
            pdf_version: String::new(),
            page_count: 0,
        }
    }
}

/// Document outline (bookmarks/table of contents).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Outline {
    /// Top-level outline items
    pub items: Vec<OutlineItem>,
}

impl Outline {
    /// Create a new empty outline.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add an item to the outline.
    pub fn add_item(&mut self, item: OutlineItem) {
        self.items.push(item);
    }

    /// Check if the outline is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the total number of items (including nested).
    pub fn total_items(&self) -> usize {
        self.flatten().len()
    }

    /// All items in reading order (depth-first, parents before children).
    pub fn flatten(&self) -> Vec<&OutlineItem> {
        fn walk<'a>(items: &'a [OutlineItem], out: &mut Vec<&'a OutlineItem>) {
            for item in items {
                out.push(item);
                walk(&item.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.items, &mut out);
        out
    }
}

/// A single outline item (bookmark).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineItem {
    /// Item title
    pub title: String,

    /// Target page number (1-indexed)
    pub page: Option<u32>,

    /// Nesting level (0 = top level)
    pub level: u8,

    /// Child items
    pub children: Vec<OutlineItem>,
}

impl OutlineItem {
    /// Create a new outline item.
    pub fn new(title: impl Into<String>, page: Option<u32>, level: u8) -> Self {
        Self {
            title: title.into(),
            page,
            level,
            children: Vec::new(),
        }
    }

    /// Add a child item.
    pub fn add_child(&mut self, child: OutlineItem) {
        self.children.push(child);
    }
}
