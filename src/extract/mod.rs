//! Subtitle detection over loaded documents.
//!
//! The layout strategy compares every block against the document's body
//! text baseline: a block is a heading candidate when it is structurally a
//! heading, noticeably larger than body text, bold over a regular body, or
//! (optionally) set in capitals. Candidates then go through
//! [`SubtitleFilter`], which normalizes the text and drops page numbers,
//! overlong lines, excluded titles and lowercase continuations.

mod baseline;
mod filter;
mod options;

use crate::model::{Document, Outline, Subtitle, TextBlock};

pub use baseline::FontStatistics;
pub use filter::{normalize, Deduplicator, Rejection, SubtitleFilter};
pub use options::{ExtractOptions, Strategy, DEFAULT_EXCLUSIONS};

/// Extracts subtitles from a document.
pub struct SubtitleExtractor {
    options: ExtractOptions,
    filter: SubtitleFilter,
}

impl SubtitleExtractor {
    /// Create an extractor with the given options.
    pub fn new(options: ExtractOptions) -> Self {
        let filter = SubtitleFilter::new(&options);
        Self { options, filter }
    }

    /// Get the options in use.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract subtitles in document order. Never fails; a document
    /// without headings yields an empty list.
    pub fn extract(&self, document: &Document) -> Vec<Subtitle> {
        let outline = document.outline.as_ref().filter(|o| !o.is_empty());

        let subtitles = match (self.options.strategy, outline) {
            (Strategy::Outline, Some(outline)) | (Strategy::PreferOutline, Some(outline)) => {
                self.from_outline(outline)
            }
            (Strategy::Outline, None) => {
                log::debug!("Document has no outline; no subtitles");
                Vec::new()
            }
            _ => self.from_layout(document),
        };

        if self.options.deduplicate {
            let mut seen = Deduplicator::default();
            subtitles
                .into_iter()
                .filter(|s| seen.insert(&s.text))
                .collect()
        } else {
            subtitles
        }
    }

    fn from_layout(&self, document: &Document) -> Vec<Subtitle> {
        let stats = FontStatistics::from_blocks(&document.blocks);
        log::debug!(
            "Body baseline: {:.1}pt, bold={}",
            stats.body_size,
            stats.body_bold
        );

        let mut subtitles = Vec::new();
        for block in &document.blocks {
            if !self.is_candidate(block, &stats) {
                continue;
            }
            match self.filter.check(&block.text) {
                Ok(text) => {
                    let mut subtitle = Subtitle::new(text, block.page, block.sequence);
                    if let Some(level) = block.heading_level {
                        subtitle = subtitle.with_level(level);
                    }
                    subtitles.push(subtitle);
                }
                Err(reason) => {
                    log::trace!("Rejected {:?} ({:?})", block.text, reason);
                }
            }
        }
        subtitles
    }

    fn from_outline(&self, outline: &Outline) -> Vec<Subtitle> {
        let mut subtitles = Vec::new();
        for (index, item) in outline.flatten().into_iter().enumerate() {
            // Outline levels are 0-based
            let level = item.level.saturating_add(1);
            if level > self.options.max_level {
                continue;
            }
            if let Ok(text) = self.filter.check(&item.title) {
                let page = item.page.unwrap_or(1);
                subtitles.push(Subtitle::new(text, page, index).with_level(level));
            }
        }
        subtitles
    }

    /// Decide whether a block looks like a heading.
    pub fn is_candidate(&self, block: &TextBlock, stats: &FontStatistics) -> bool {
        if let Some(level) = block.heading_level {
            if level <= self.options.max_level {
                return true;
            }
        }

        if let Some(size) = block.font_size {
            if stats.is_heading_size(size, self.options.size_delta) {
                return true;
            }
        }

        if self.options.detect_bold && block.is_bold && !stats.body_bold {
            return true;
        }

        self.options.uppercase_as_heading && block.is_uppercase()
    }
}

impl Default for SubtitleExtractor {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}

/// Extract subtitles with the given options.
pub fn extract_subtitles(document: &Document, options: &ExtractOptions) -> Vec<Subtitle> {
    SubtitleExtractor::new(options.clone()).extract(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::SourceFormat;
    use crate::model::OutlineItem;

    fn pdf(lines: &[(&str, f32, bool)]) -> Document {
        let mut doc = Document::new(SourceFormat::Pdf);
        for (text, size, bold) in lines {
            doc.push_block(TextBlock::new(*text, 1).with_font_size(*size).with_bold(*bold));
        }
        doc
    }

    fn texts(subtitles: &[Subtitle]) -> Vec<&str> {
        subtitles.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_bold_lines_become_subtitles() {
        let doc = pdf(&[
            ("1. Objeto", 12.0, true),
            ("Descripción del objeto...", 12.0, false),
            ("2. Plazo", 12.0, true),
        ]);
        let subtitles = SubtitleExtractor::default().extract(&doc);
        assert_eq!(texts(&subtitles), ["1. Objeto", "2. Plazo"]);
        // Index of the source line, not of the subtitle
        assert_eq!(subtitles[1].sequence, 2);
    }

    #[test]
    fn test_larger_lines_become_subtitles() {
        let doc = pdf(&[
            ("CONDICIONES GENERALES", 16.0, false),
            ("El presente pliego regula la contratación.", 10.0, false),
            ("Otro párrafo cualquiera del cuerpo.", 10.0, false),
        ]);
        let subtitles = SubtitleExtractor::default().extract(&doc);
        assert_eq!(texts(&subtitles), ["CONDICIONES GENERALES"]);
    }

    #[test]
    fn test_bold_body_disables_bold_signal() {
        let doc = pdf(&[
            ("Todo el documento en negrita", 12.0, true),
            ("Incluso esta línea", 12.0, true),
        ]);
        assert!(SubtitleExtractor::default().extract(&doc).is_empty());
    }

    #[test]
    fn test_uppercase_signal() {
        let doc = pdf(&[
            ("GARANTÍAS", 12.0, false),
            ("Texto normal del cuerpo del pliego.", 12.0, false),
        ]);
        assert!(SubtitleExtractor::default().extract(&doc).is_empty());

        let options = ExtractOptions::new().with_uppercase_headings(true);
        let subtitles = extract_subtitles(&doc, &options);
        assert_eq!(texts(&subtitles), ["GARANTÍAS"]);
    }

    #[test]
    fn test_exclusions_and_dedup() {
        let doc = pdf(&[
            ("Etapas y Plazos", 12.0, true),
            ("Objeto", 12.0, true),
            ("cuerpo del texto largo del documento", 12.0, false),
            ("Objeto", 12.0, true),
        ]);
        let subtitles = SubtitleExtractor::default().extract(&doc);
        assert_eq!(texts(&subtitles), ["Objeto", "Objeto"]);

        let options = ExtractOptions::new().with_deduplicate(true);
        assert_eq!(texts(&extract_subtitles(&doc, &options)), ["Objeto"]);
    }

    #[test]
    fn test_structural_headings_respect_max_level() {
        let mut doc = Document::new(SourceFormat::Html);
        doc.push_block(TextBlock::new("Pliego", 1).with_heading_level(1));
        doc.push_block(TextBlock::new("Detalle", 1).with_heading_level(4));
        doc.push_block(TextBlock::new("Texto", 1));

        let options = ExtractOptions::new().with_max_level(3);
        let subtitles = extract_subtitles(&doc, &options);
        assert_eq!(texts(&subtitles), ["Pliego"]);
        assert_eq!(subtitles[0].level, Some(1));
    }

    #[test]
    fn test_outline_strategies() {
        let mut doc = pdf(&[("Objeto", 12.0, true), ("cuerpo", 12.0, false)]);
        let mut outline = Outline::new();
        let mut item = OutlineItem::new("1. Condiciones", Some(2), 0);
        item.add_child(OutlineItem::new("1.1 Alcance", Some(3), 1));
        outline.add_item(item);

        let outline_only = ExtractOptions::new().with_strategy(Strategy::Outline);
        assert!(extract_subtitles(&doc, &outline_only).is_empty());

        let prefer = ExtractOptions::new().with_strategy(Strategy::PreferOutline);
        assert_eq!(texts(&extract_subtitles(&doc, &prefer)), ["Objeto"]);

        doc.outline = Some(outline);
        let subtitles = extract_subtitles(&doc, &prefer);
        assert_eq!(texts(&subtitles), ["1. Condiciones", "1.1 Alcance"]);
        assert_eq!(subtitles[1].page, 3);
        assert_eq!(subtitles[1].level, Some(2));
        assert_eq!(subtitles[1].sequence, 1);

        let shallow = outline_only.with_max_level(1);
        assert_eq!(texts(&extract_subtitles(&doc, &shallow)), ["1. Condiciones"]);
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new(SourceFormat::Pdf);
        assert!(SubtitleExtractor::default().extract(&doc).is_empty());
    }
}
