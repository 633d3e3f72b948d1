//! # pbcsub
//!
//! Subtitle extraction for procurement specification documents (PBC,
//! *Pliego de Bases y Condiciones*).
//!
//! PDF and HTML documents are loaded into a flat sequence of text blocks,
//! blocks styled as headings are picked out against the document's body
//! text, and the resulting subtitles are written to CSV with a single
//! `subtitulo` column.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pbcsub::{extract_from_file, render};
//!
//! fn main() -> pbcsub::Result<()> {
//!     let subtitles = extract_from_file("inputs/pliego.pdf")?;
//!     render::write_csv(&subtitles, "outputs/pliego.csv")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Batch processing
//!
//! ```no_run
//! use pbcsub::{run_batch, BatchOptions};
//!
//! let report = run_batch(&BatchOptions::default())?;
//! println!("{} files, {} failed", report.files.len(), report.failed);
//! # Ok::<(), pbcsub::Error>(())
//! ```

pub mod batch;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use batch::{
    process_file, run_batch, run_batch_with_progress, BatchEvent, BatchOptions, BatchReport,
    FileReport,
};
pub use detect::{detect_format_from_path, SourceFormat};
pub use error::{Error, Result};
pub use extract::{extract_subtitles, ExtractOptions, Strategy, SubtitleExtractor};
pub use model::{Document, Metadata, Outline, OutlineItem, Subtitle, TextBlock};
pub use parser::{load_file, ErrorMode, HtmlParser, LoadOptions, PageSelection, PdfParser};

use std::path::Path;

/// Load a PDF or HTML file with default options.
///
/// # Example
///
/// ```no_run
/// use pbcsub::parse_file;
///
/// let doc = parse_file("inputs/pliego.html").unwrap();
/// println!("Blocks: {}", doc.block_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    load_file(path, &LoadOptions::default())
}

/// Load a PDF or HTML file with custom options.
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Document> {
    load_file(path, options)
}

/// Extract subtitles from a file with default options.
pub fn extract_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Subtitle>> {
    let doc = parse_file(path)?;
    Ok(SubtitleExtractor::default().extract(&doc))
}

/// Extract subtitles from a file with custom options.
///
/// # Example
///
/// ```no_run
/// use pbcsub::{extract_from_file_with_options, ExtractOptions, LoadOptions};
///
/// let extract = ExtractOptions::new().with_deduplicate(true);
/// let subtitles =
///     extract_from_file_with_options("inputs/pliego.pdf", &LoadOptions::new(), &extract)
///         .unwrap();
/// ```
pub fn extract_from_file_with_options<P: AsRef<Path>>(
    path: P,
    load: &LoadOptions,
    extract: &ExtractOptions,
) -> Result<Vec<Subtitle>> {
    let doc = load_file(path, load)?;
    Ok(extract_subtitles(&doc, extract))
}

/// Builder for loading a document and writing its subtitles.
///
/// # Example
///
/// ```no_run
/// use pbcsub::Pbcsub;
///
/// let count = Pbcsub::new()
///     .strict()
///     .exclude("Anexos")
///     .unique()
///     .to_csv("inputs/pliego.pdf", "outputs/pliego.csv")?;
/// # Ok::<(), pbcsub::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pbcsub {
    load_options: LoadOptions,
    extract_options: ExtractOptions,
}

impl Pbcsub {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first unreadable page.
    pub fn strict(mut self) -> Self {
        self.load_options = self.load_options.strict();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.load_options = self.load_options.with_pages(pages);
        self
    }

    /// Set the extraction strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.extract_options = self.extract_options.with_strategy(strategy);
        self
    }

    /// Add a subtitle to the exclusion list.
    pub fn exclude(mut self, text: impl Into<String>) -> Self {
        self.extract_options = self.extract_options.exclude(text);
        self
    }

    /// Drop repeated subtitles.
    pub fn unique(mut self) -> Self {
        self.extract_options = self.extract_options.with_deduplicate(true);
        self
    }

    /// Replace the extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract_options = options;
        self
    }

    /// Extract subtitles from a file.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Subtitle>> {
        extract_from_file_with_options(path, &self.load_options, &self.extract_options)
    }

    /// Extract subtitles from `input` and write them to `output`, returning
    /// the number of rows written.
    pub fn to_csv<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<usize> {
        let subtitles = self.extract(input)?;
        render::write_csv(&subtitles, output)?;
        Ok(subtitles.len())
    }
}
