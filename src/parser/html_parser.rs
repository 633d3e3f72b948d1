//! HTML document loader.

use std::path::Path;

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::detect::SourceFormat;
use crate::error::{Error, Result};
use crate::model::{Document, TextBlock};

/// Elements emitted as text blocks.
const BLOCK_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "td", "th", "dt", "dd", "caption",
];

/// Containers whose boundaries separate words.
const STRUCTURAL_TAGS: &[&str] = &[
    "div", "section", "article", "header", "footer", "ul", "ol", "dl", "table", "thead",
    "tbody", "tr", "blockquote",
];

/// Elements whose text never reaches the document.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// HTML document parser.
pub struct HtmlParser {
    html: String,
}

impl HtmlParser {
    /// Read an HTML file. Invalid UTF-8 is replaced rather than rejected.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
        Ok(Self::from_html(String::from_utf8_lossy(&bytes)))
    }

    /// Wrap HTML source already in memory.
    pub fn from_html(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Parse the markup into one text block per block-level element.
    pub fn parse(&self) -> Result<Document> {
        let html = Html::parse_document(&self.html);
        let mut document = Document::new(SourceFormat::Html);
        document.metadata.page_count = 1;

        let title_selector = selector("title")?;
        document.metadata.title = html
            .select(&title_selector)
            .next()
            .map(|t| collapse_whitespace(&t.text().collect::<String>()))
            .filter(|t| !t.is_empty());

        let block_selector = selector(&BLOCK_TAGS.join(", "))?;
        for element in html.select(&block_selector) {
            if has_block_ancestor(element) {
                continue;
            }

            for (run, level) in split_block(element) {
                let text = collapse_whitespace(&run.text);
                if text.is_empty() {
                    continue;
                }
                let mut block = TextBlock::new(text, 1).with_bold(run.is_bold());
                if let Some(level) = level {
                    block = block.with_heading_level(level);
                }
                document.push_block(block);
            }
        }

        log::debug!("Parsed HTML: {} blocks", document.block_count());
        Ok(document)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::HtmlParse(format!("{:?}", e)))
}

/// Split a top-level block into runs in document order.
///
/// Headings nested inside another block (`<li><h3>..</h3><p>..</p></li>`)
/// come out as runs of their own carrying their level.
fn split_block(element: ElementRef<'_>) -> Vec<(TextRun, Option<u8>)> {
    let level = heading_level(element.value().name());
    let mut segments = Vec::new();
    let mut run = TextRun {
        split_headings: level.is_none(),
        ..TextRun::default()
    };
    run.collect(element, is_bold_element(element), &mut segments);
    segments.push((run, level));
    segments
}

/// Text of one block along with how much of it is bold.
#[derive(Default)]
struct TextRun {
    text: String,
    chars: usize,
    bold_chars: usize,
    split_headings: bool,
}

impl TextRun {
    fn collect(
        &mut self,
        element: ElementRef<'_>,
        bold: bool,
        segments: &mut Vec<(TextRun, Option<u8>)>,
    ) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    let count = text.chars().filter(|c| !c.is_whitespace()).count();
                    self.chars += count;
                    if bold {
                        self.bold_chars += count;
                    }
                    self.text.push_str(text);
                }
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    let name = child.value().name();
                    if SKIPPED_TAGS.contains(&name) {
                        continue;
                    }
                    if name == "br" {
                        self.text.push(' ');
                        continue;
                    }
                    let child_bold = bold || is_bold_element(child);
                    if let Some(level) = heading_level(name).filter(|_| self.split_headings) {
                        let before = std::mem::take(self);
                        self.split_headings = true;
                        segments.push((before, None));
                        let mut heading = TextRun::default();
                        heading.collect(child, child_bold, segments);
                        segments.push((heading, Some(level)));
                        continue;
                    }
                    let separated = BLOCK_TAGS.contains(&name) || STRUCTURAL_TAGS.contains(&name);
                    if separated {
                        self.text.push(' ');
                    }
                    self.collect(child, child_bold, segments);
                    if separated {
                        self.text.push(' ');
                    }
                }
                _ => {}
            }
        }
    }

    fn is_bold(&self) -> bool {
        self.chars > 0 && self.bold_chars * 2 > self.chars
    }
}

fn has_block_ancestor(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| BLOCK_TAGS.contains(&a.value().name()))
}

fn heading_level(name: &str) -> Option<u8> {
    match name.as_bytes() {
        [b'h', level @ b'1'..=b'6'] => Some(level - b'0'),
        _ => None,
    }
}

fn is_bold_element(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if matches!(value.name(), "b" | "strong") {
        return true;
    }
    value.attr("style").is_some_and(style_is_bold)
}

/// Check an inline style for a bold `font-weight`.
fn style_is_bold(style: &str) -> bool {
    style.split(';').any(|decl| {
        let Some((prop, value)) = decl.split_once(':') else {
            return false;
        };
        if !prop.trim().eq_ignore_ascii_case("font-weight") {
            return false;
        }
        let value = value.trim().trim_end_matches("!important").trim();
        match value.to_ascii_lowercase().as_str() {
            "bold" | "bolder" => true,
            other => other.parse::<u16>().is_ok_and(|w| (600..=900).contains(&w)),
        }
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
