//! Document loading for PDF and HTML sources.

mod backend;
mod html_parser;
mod layout;
mod options;
mod pdf_parser;

use std::path::Path;

use crate::detect::{detect_format_from_path, SourceFormat};
use crate::error::Result;
use crate::model::Document;

pub use backend::{
    decode_text_simple, is_bold_font_name, BackendFontInfo, ContentOp, FontMetrics, LopdfBackend,
    PageId, PdfBackend, PdfValue,
};
pub use html_parser::HtmlParser;
pub use layout::{group_spans_into_lines, LayoutAnalyzer, TextLine, TextSpan};
pub use options::{ErrorMode, LoadOptions, PageSelection};
pub use pdf_parser::PdfParser;

/// Load a document, choosing the parser from the file extension.
pub fn load_file<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Document> {
    let path = path.as_ref();
    match detect_format_from_path(path)? {
        SourceFormat::Pdf => PdfParser::open(path, options.clone())?.parse(),
        SourceFormat::Html => HtmlParser::open(path)?.parse(),
    }
}
