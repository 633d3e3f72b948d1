//! Input format detection and validation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Portable Document Format
    Pdf,
    /// HTML page (e.g. a PDF previously converted to HTML)
    Html,
}

impl SourceFormat {
    /// Lowercase extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Pdf => "pdf",
            SourceFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Pdf => write!(f, "PDF"),
            SourceFormat::Html => write!(f, "HTML"),
        }
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Detect the input format from a path's extension (case-insensitive).
///
/// # Returns
/// * `Err(Error::UnsupportedFormat)` unless the extension is `pdf` or `html`
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SourceFormat> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| {
            Error::UnsupportedFormat(format!("{} has no extension", path.display()))
        })?;

    match ext.as_str() {
        "pdf" => Ok(SourceFormat::Pdf),
        "html" => Ok(SourceFormat::Html),
        other => Err(Error::UnsupportedFormat(format!(
            ".{} ({})",
            other,
            path.display()
        ))),
    }
}

/// Read the PDF version from a file header.
///
/// A missing file or a header without `%PDF-x.y` is reported as
/// [`Error::FileRead`].
pub fn pdf_version_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| Error::file_read(path, e))?;
    let mut header = [0u8; 16];
    let read = file
        .read(&mut header)
        .map_err(|e| Error::file_read(path, e))?;
    pdf_version_from_bytes(&header[..read])
        .ok_or_else(|| Error::file_read(path, "missing %PDF- header"))
}

/// Read the PDF version from the first bytes of a file.
pub fn pdf_version_from_bytes(data: &[u8]) -> Option<String> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return None;
    }

    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    is_valid_version(&version).then_some(version)
}

/// Check if a version string is valid.
fn is_valid_version(version: &str) -> bool {
    if version.len() != 3 {
        return false;
    }

    let chars: Vec<char> = version.chars().collect();
    chars[0].is_ascii_digit() && chars[1] == '.' && chars[2].is_ascii_digit()
}

/// Check if bytes start with a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    pdf_version_from_bytes(data).is_some()
}
