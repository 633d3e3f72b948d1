//! PDF document loader.

use std::path::Path;

use crate::detect::{is_pdf_bytes, pdf_version_from_path, SourceFormat};
use crate::error::{Error, Result};
use crate::model::{Document, TextBlock};

use super::backend::{LopdfBackend, PdfBackend};
use super::layout::{LayoutAnalyzer, TextLine};
use super::options::{ErrorMode, LoadOptions};

/// PDF document parser.
pub struct PdfParser<B: PdfBackend = LopdfBackend> {
    backend: B,
    options: LoadOptions,
}

impl PdfParser<LopdfBackend> {
    /// Open a PDF file.
    ///
    /// A missing file, a file without a `%PDF-` header, or one lopdf cannot
    /// load is reported as [`Error::FileRead`].
    pub fn open<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<Self> {
        let path = path.as_ref();

        pdf_version_from_path(path)?;

        let backend = LopdfBackend::load_file(path).map_err(|e| Error::file_read(path, e))?;
        if backend.is_encrypted() {
            log::warn!("{} is encrypted; text may not decode", path.display());
        }

        Ok(Self::from_backend(backend, options))
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8], options: LoadOptions) -> Result<Self> {
        if !is_pdf_bytes(data) {
            return Err(Error::PdfParse("missing %PDF- header".to_string()));
        }
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(Self::from_backend(backend, options))
    }
}

impl<B: PdfBackend> PdfParser<B> {
    /// Wrap an already loaded backend.
    pub fn from_backend(backend: B, options: LoadOptions) -> Self {
        Self { backend, options }
    }

    /// Parse the document into text blocks, one per line, in reading order.
    pub fn parse(&self) -> Result<Document> {
        let mut document = Document::new(SourceFormat::Pdf);
        document.metadata.pdf_version = self.backend.version();
        document.metadata.title = self.backend.title();

        let pages = self.backend.pages();
        document.metadata.page_count = pages.len() as u32;

        let analyzer = LayoutAnalyzer::new(&self.backend);
        for &page_num in pages.keys() {
            if !self.options.pages.includes(page_num) {
                continue;
            }

            match analyzer.extract_page_lines(page_num) {
                Ok(lines) => {
                    for line in lines {
                        if let Some(block) = line_to_block(&line, page_num) {
                            document.push_block(block);
                        }
                    }
                }
                Err(e) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("Skipping page {}: {}", page_num, e);
                }
            }
        }

        let outline = self.backend.outline();
        if !outline.is_empty() {
            document.outline = Some(outline);
        }

        log::debug!(
            "Parsed PDF: {} pages, {} lines",
            document.metadata.page_count,
            document.block_count()
        );
        Ok(document)
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }
}

fn line_to_block(line: &TextLine, page: u32) -> Option<TextBlock> {
    let text = line.text();
    if text.trim().is_empty() {
        return None;
    }
    Some(
        TextBlock::new(text, page)
            .with_font_size(line.font_size)
            .with_bold(line.is_bold())
            .with_position(line.x, line.y),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::model::{Outline, OutlineItem};
    use crate::parser::backend::{BackendFontInfo, ContentOp, FontMetrics, PageId, PdfValue};
    use crate::parser::PageSelection;

    /// In-memory backend serving pre-decoded content operations.
    struct MockBackend {
        pages: Vec<Vec<ContentOp>>,
        outline: Outline,
    }

    impl PdfBackend for MockBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            (1..=self.pages.len() as u32).map(|n| (n, (n, 0))).collect()
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>> {
            Ok(vec![
                BackendFontInfo {
                    name: b"F1".to_vec(),
                    base_font: "Helvetica".to_string(),
                    descriptor_bold: false,
                    metrics: FontMetrics::standard("Helvetica"),
                },
                BackendFontInfo {
                    name: b"F2".to_vec(),
                    base_font: "Helvetica-Bold".to_string(),
                    descriptor_bold: false,
                    metrics: FontMetrics::standard("Helvetica-Bold"),
                },
            ])
        }

        fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
            Ok(page.0.to_be_bytes().to_vec())
        }

        fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
            let page = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
            self.pages
                .get(page as usize - 1)
                .cloned()
                .ok_or_else(|| Error::PdfParse(format!("no content for page {}", page)))
        }

        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            String::from_utf8_lossy(bytes).to_string()
        }

        fn outline(&self) -> Outline {
            self.outline.clone()
        }
    }

    fn show(font: &str, size: i64, x: i64, y: i64, text: &str) -> Vec<ContentOp> {
        vec![
            ContentOp::new("BT", vec![]),
            ContentOp::new(
                "Tf",
                vec![PdfValue::Name(font.as_bytes().to_vec()), PdfValue::Integer(size)],
            ),
            ContentOp::new("Td", vec![PdfValue::Integer(x), PdfValue::Integer(y)]),
            ContentOp::new("Tj", vec![PdfValue::Str(text.as_bytes().to_vec())]),
            ContentOp::new("ET", vec![]),
        ]
    }

    fn mock(pages: Vec<Vec<ContentOp>>) -> MockBackend {
        MockBackend {
            pages,
            outline: Outline::new(),
        }
    }

    #[test]
    fn test_parse_lines_with_style() {
        let page = [
            show("F2", 12, 72, 700, "1. Objeto"),
            show("F1", 12, 72, 680, "Descripción del objeto..."),
            show("F2", 12, 72, 660, "2. Plazo"),
        ]
        .concat();
        let doc = PdfParser::from_backend(mock(vec![page]), LoadOptions::default())
            .parse()
            .unwrap();

        let texts: Vec<_> = doc.blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, ["1. Objeto", "Descripción del objeto...", "2. Plazo"]);
        let bold: Vec<_> = doc.blocks.iter().map(|b| b.is_bold).collect();
        assert_eq!(bold, [true, false, true]);
        assert_eq!(doc.blocks[0].font_size, Some(12.0));
        assert_eq!(doc.metadata.page_count, 1);
    }

    #[test]
    fn test_parse_respects_page_selection() {
        let pages = vec![
            show("F1", 12, 72, 700, "Primera"),
            show("F1", 12, 72, 700, "Segunda"),
        ];
        let options = LoadOptions::new().with_pages(PageSelection::Pages(vec![2]));
        let doc = PdfParser::from_backend(mock(pages), options).parse().unwrap();

        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].text, "Segunda");
        assert_eq!(doc.blocks[0].page, 2);
    }

    #[test]
    fn test_text_matrix_scales_font_size() {
        let page = vec![
            ContentOp::new("BT", vec![]),
            ContentOp::new(
                "Tf",
                vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Integer(1)],
            ),
            ContentOp::new(
                "Tm",
                vec![
                    PdfValue::Integer(18),
                    PdfValue::Integer(0),
                    PdfValue::Integer(0),
                    PdfValue::Integer(18),
                    PdfValue::Integer(72),
                    PdfValue::Integer(700),
                ],
            ),
            ContentOp::new("Tj", vec![PdfValue::Str(b"ANEXO".to_vec())]),
            ContentOp::new("ET", vec![]),
        ];
        let doc = PdfParser::from_backend(mock(vec![page]), LoadOptions::default())
            .parse()
            .unwrap();

        assert_eq!(doc.blocks[0].font_size, Some(18.0));
    }

    fn place(x: f32, y: f32) -> ContentOp {
        let operands = [1.0, 0.0, 0.0, 1.0, x, y].into_iter().map(PdfValue::Real).collect();
        ContentOp::new("Tm", operands)
    }

    fn tj(text: &str) -> ContentOp {
        ContentOp::new("Tj", vec![PdfValue::Str(text.as_bytes().to_vec())])
    }

    #[test]
    fn test_positioned_fragments_form_one_word() {
        let page = vec![
            ContentOp::new("BT", vec![]),
            ContentOp::new(
                "Tf",
                vec![PdfValue::Name(b"F2".to_vec()), PdfValue::Integer(12)],
            ),
            place(72.0, 700.0),
            tj("Ob"),
            place(88.67, 700.0),
            tj("jeto"),
            place(117.0, 700.0),
            tj("del llamado"),
            ContentOp::new("ET", vec![]),
        ];
        let doc = PdfParser::from_backend(mock(vec![page]), LoadOptions::default())
            .parse()
            .unwrap();

        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].text, "Objeto del llamado");
    }

    #[test]
    fn test_consecutive_shows_advance_by_glyph_width() {
        let page = vec![
            ContentOp::new("BT", vec![]),
            ContentOp::new(
                "Tf",
                vec![PdfValue::Name(b"F1".to_vec()), PdfValue::Integer(12)],
            ),
            place(72.0, 700.0),
            tj("Garan"),
            tj("tías"),
            ContentOp::new("ET", vec![]),
        ];
        let doc = PdfParser::from_backend(mock(vec![page]), LoadOptions::default())
            .parse()
            .unwrap();

        assert_eq!(doc.blocks[0].text, "Garantías");
    }

    #[test]
    fn test_negative_font_size() {
        let mut page = Vec::new();
        for (x, text) in [(72, "1."), (86, "Objeto")] {
            page.extend([
                ContentOp::new("BT", vec![]),
                ContentOp::new(
                    "Tf",
                    vec![PdfValue::Name(b"F2".to_vec()), PdfValue::Integer(-12)],
                ),
                ContentOp::new("Td", vec![PdfValue::Integer(x), PdfValue::Integer(700)]),
                tj(text),
                ContentOp::new("ET", vec![]),
            ]);
        }
        let doc = PdfParser::from_backend(mock(vec![page]), LoadOptions::default())
            .parse()
            .unwrap();

        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].text, "1. Objeto");
        assert_eq!(doc.blocks[0].font_size, Some(12.0));
    }

    #[test]
    fn test_fill_stroke_render_mode_is_bold() {
        let mut page = vec![ContentOp::new("Tr", vec![PdfValue::Integer(2)])];
        page.extend(show("F1", 12, 72, 700, "Garantías"));
        let doc = PdfParser::from_backend(mock(vec![page]), LoadOptions::default())
            .parse()
            .unwrap();

        assert!(doc.blocks[0].is_bold);
    }

    #[test]
    fn test_strict_mode_fails_on_bad_page() {
        // Page 3 is listed but has no content
        struct Broken(MockBackend);
        impl PdfBackend for Broken {
            fn pages(&self) -> BTreeMap<u32, PageId> {
                let mut pages = self.0.pages();
                pages.insert(3, (3, 0));
                pages
            }
            fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
                self.0.page_fonts(page)
            }
            fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
                self.0.page_content(page)
            }
            fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
                self.0.decode_content(data)
            }
            fn decode_text(&self, page: PageId, font: &[u8], bytes: &[u8]) -> String {
                self.0.decode_text(page, font, bytes)
            }
        }

        let backend = mock(vec![show("F1", 12, 72, 700, "Uno")]);
        let strict = PdfParser::from_backend(Broken(backend), LoadOptions::new().strict());
        assert!(strict.parse().is_err());

        let backend = mock(vec![show("F1", 12, 72, 700, "Uno")]);
        let lenient = PdfParser::from_backend(Broken(backend), LoadOptions::new().lenient());
        let doc = lenient.parse().unwrap();
        assert_eq!(doc.blocks.len(), 1);
    }

    #[test]
    fn test_outline_is_attached() {
        let mut backend = mock(vec![show("F1", 12, 72, 700, "Texto")]);
        backend
            .outline
            .add_item(OutlineItem::new("Condiciones generales", Some(1), 0));
        let doc = PdfParser::from_backend(backend, LoadOptions::default())
            .parse()
            .unwrap();

        assert!(doc.has_outline());
    }
}
