//! Error types for pbcsub.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pbcsub operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, extracting or writing.
#[derive(Error, Debug)]
pub enum Error {
    /// The file extension is neither `.pdf` nor `.html`.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The input file is missing, unreadable or corrupt.
    #[error("Cannot read {}: {reason}", path.display())]
    FileRead {
        /// Offending input file
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// The output file could not be written.
    #[error("Cannot write {}: {source}", path.display())]
    Write {
        /// Target output file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Error parsing HTML content.
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// I/O error outside of a specific input or output file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a [`Error::FileRead`] for `path`.
    pub fn file_read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::FileRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Short stable label for reports and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnsupportedFormat(_) => "unsupported_format",
            Error::FileRead { .. } => "file_read",
            Error::Write { .. } => "write",
            Error::PdfParse(_) => "pdf_parse",
            Error::HtmlParse(_) => "html_parse",
            Error::PageOutOfRange(..) => "page_out_of_range",
            Error::InvalidPageRange(_) => "invalid_page_range",
            Error::Io(_) => "io",
            Error::Csv(_) => "csv",
            Error::Json(_) => "json",
            Error::Other(_) => "other",
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
