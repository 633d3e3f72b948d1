//! Layout analysis for PDF pages.
//!
//! Interprets page content streams to recover positioned text spans with
//! their font size and weight, then groups the spans into reading-order lines.

use std::collections::HashMap;

use crate::error::{Error, Result};

use super::backend::{
    get_number_from_value, is_bold_font_name, FontMetrics, PageId, PdfBackend, PdfValue,
};

/// Horizontal gap between spans, as a fraction of the font size, read as a word break.
const WORD_GAP_RATIO: f32 = 0.1;

/// TJ adjustments (thousandths of an em) larger than this read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Text render mode 2: fill then stroke, used to fake bold.
const RENDER_MODE_FILL_STROKE: i64 = 2;

/// A text span with position and style information.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Advance width of the text in page units
    pub width: f32,
    /// Effective font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the text is rendered bold
    pub is_bold: bool,
}

impl TextSpan {
    /// Create a new text span, deriving boldness from the font name.
    pub fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let is_bold = is_bold_font_name(&font_name);
        Self {
            text,
            x,
            y,
            width: 0.0,
            font_size,
            font_name,
            is_bold,
        }
    }

    /// Override the bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.is_bold = bold;
        self
    }

    /// Set the advance width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    fn weight(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// A text line composed of multiple spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        if spans.is_empty() {
            return Self {
                spans,
                y: 0.0,
                x: 0.0,
                font_size: 0.0,
            };
        }

        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

        // Dominant font size, weighted by visible characters
        let total_chars: usize = spans.iter().map(TextSpan::weight).sum();
        let weighted_size: f32 = spans
            .iter()
            .map(|s| s.font_size * s.weight() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted_size / total_chars as f32
        } else {
            spans[0].font_size
        };

        Self {
            y: spans[0].y,
            x: spans[0].x,
            spans,
            font_size,
        }
    }

    /// Get the combined text of all spans.
    ///
    /// Inserts a space between spans separated by a visible horizontal gap.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.x - (prev.x + prev.width);
                let threshold = span.font_size * WORD_GAP_RATIO;
                let has_space = prev.text.ends_with(char::is_whitespace)
                    || span.text.starts_with(char::is_whitespace);
                if gap > threshold && !has_space {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }

        result
    }

    /// Check if the line is predominantly bold.
    pub fn is_bold(&self) -> bool {
        let bold_chars: usize = self
            .spans
            .iter()
            .filter(|s| s.is_bold)
            .map(TextSpan::weight)
            .sum();
        let total_chars: usize = self.spans.iter().map(TextSpan::weight).sum();
        total_chars > 0 && bold_chars as f32 / total_chars as f32 > 0.5
    }
}

/// Layout analyzer for extracting positioned text lines from PDF pages.
pub struct LayoutAnalyzer<'a, B: PdfBackend> {
    backend: &'a B,
}

impl<'a, B: PdfBackend> LayoutAnalyzer<'a, B> {
    /// Create a new layout analyzer.
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Extract text lines from a page in reading order (top to bottom).
    pub fn extract_page_lines(&self, page_num: u32) -> Result<Vec<TextLine>> {
        let spans = self.extract_page_spans(page_num)?;
        Ok(group_spans_into_lines(spans))
    }

    /// Extract text spans from a page with position and font information.
    pub fn extract_page_spans(&self, page_num: u32) -> Result<Vec<TextSpan>> {
        let pages = self.backend.pages();
        let page_id = *pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;

        let fonts: HashMap<Vec<u8>, PageFont> = self
            .backend
            .page_fonts(page_id)?
            .into_iter()
            .map(|f| {
                let font = PageFont {
                    bold: f.is_bold(),
                    base_font: f.base_font,
                    metrics: f.metrics,
                };
                (f.name, font)
            })
            .collect();
        let fallback = PageFont::default();

        let content = self.backend.page_content(page_id)?;
        let ops = self.backend.decode_content(&content)?;

        let mut state = TextState::default();
        let mut spans = Vec::new();

        for op in ops {
            let operands = &op.operands;
            let font = fonts.get(&state.font_resource).unwrap_or(&fallback);
            match op.operator.as_str() {
                "q" => state.save(),
                "Q" => state.restore(),
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.ctm = m.multiply(&state.ctm);
                    }
                }
                "BT" => state.begin_text(),
                "ET" => state.in_text = false,
                "Tf" => {
                    if let [PdfValue::Name(name), size, ..] = operands.as_slice() {
                        state.font_resource = name.clone();
                        match fonts.get(name) {
                            Some(font) => {
                                state.font_name = font.base_font.clone();
                                state.font_bold = font.bold;
                            }
                            None => {
                                state.font_name = String::from_utf8_lossy(name).to_string();
                                state.font_bold = false;
                            }
                        }
                        state.font_size = get_number_from_value(size).unwrap_or(12.0);
                    }
                }
                "Tc" => {
                    if let Some(v) = operands.first().and_then(get_number_from_value) {
                        state.char_spacing = v;
                    }
                }
                "Tw" => {
                    if let Some(v) = operands.first().and_then(get_number_from_value) {
                        state.word_spacing = v;
                    }
                }
                "Tz" => {
                    if let Some(v) = operands.first().and_then(get_number_from_value) {
                        state.horizontal_scaling = v / 100.0;
                    }
                }
                "TL" => {
                    if let Some(l) = operands.first().and_then(get_number_from_value) {
                        state.leading = l;
                    }
                }
                "Tr" => {
                    state.render_mode = match operands.first() {
                        Some(PdfValue::Integer(mode)) => *mode,
                        _ => 0,
                    };
                }
                "Td" | "TD" => {
                    if let [tx, ty, ..] = operands.as_slice() {
                        let tx = get_number_from_value(tx).unwrap_or(0.0);
                        let ty = get_number_from_value(ty).unwrap_or(0.0);
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        state.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.line_matrix = m;
                        state.text_matrix = m;
                    }
                }
                "T*" => state.next_line(),
                "Tj" => {
                    if let Some(PdfValue::Str(bytes)) = operands.first() {
                        let text = self.decode(page_id, &state, bytes);
                        let advance = state.string_advance(&font.metrics, bytes);
                        show(&mut state, text, advance, &mut spans);
                    }
                }
                "TJ" => {
                    if let Some(PdfValue::Array(items)) = operands.first() {
                        let text = self.decode_tj(page_id, &state, items);
                        let advance = state.array_advance(&font.metrics, items);
                        show(&mut state, text, advance, &mut spans);
                    }
                }
                "'" | "\"" => {
                    let text_idx = if op.operator == "\"" {
                        if let [aw, ac, ..] = operands.as_slice() {
                            state.word_spacing = get_number_from_value(aw).unwrap_or(0.0);
                            state.char_spacing = get_number_from_value(ac).unwrap_or(0.0);
                        }
                        2
                    } else {
                        0
                    };
                    state.next_line();
                    if let Some(PdfValue::Str(bytes)) = operands.get(text_idx) {
                        let text = self.decode(page_id, &state, bytes);
                        let advance = state.string_advance(&font.metrics, bytes);
                        show(&mut state, text, advance, &mut spans);
                    }
                }
                _ => {}
            }
        }

        log::debug!("Page {}: {} text spans", page_num, spans.len());
        Ok(spans)
    }

    fn decode(&self, page_id: PageId, state: &TextState, bytes: &[u8]) -> String {
        self.backend
            .decode_text(page_id, &state.font_resource, bytes)
    }

    /// Decode a TJ array, turning large negative adjustments into spaces.
    fn decode_tj(
        &self,
        page_id: PageId,
        state: &TextState,
        items: &[PdfValue],
    ) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                PdfValue::Str(bytes) => combined.push_str(&self.decode(page_id, state, bytes)),
                other => {
                    let adjustment = -get_number_from_value(other).unwrap_or(0.0);
                    if adjustment > TJ_SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(char::is_whitespace)
                    {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }
}

/// Record a shown string as a span and move the text position past it.
///
/// `advance` is in unscaled text space units.
fn show(state: &mut TextState, text: String, advance: f32, spans: &mut Vec<TextSpan>) {
    if !state.in_text {
        return;
    }

    if !text.trim().is_empty() {
        let device = state.text_matrix.multiply(&state.ctm);
        // Tf sizes may be negative
        let effective_size = (state.font_size * device.vertical_scale()).abs();
        let width = (advance * device.horizontal_scale()).abs();
        let bold = state.font_bold || state.render_mode == RENDER_MODE_FILL_STROKE;
        spans.push(
            TextSpan::new(text, device.e, device.f, effective_size, state.font_name.clone())
                .with_bold(bold)
                .with_width(width),
        );
    }

    state.text_matrix = Matrix::translation(advance, 0.0).multiply(&state.text_matrix);
}

/// Font properties the interpreter needs while showing text.
#[derive(Debug, Clone, Default)]
struct PageFont {
    base_font: String,
    bold: bool,
    metrics: FontMetrics,
}

/// Group spans into lines based on baseline, top to bottom.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    // PDF Y grows upwards: sort descending, then left to right
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= y_tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Graphics and text state tracked while walking a content stream.
#[derive(Debug, Clone)]
struct TextState {
    ctm: Matrix,
    saved: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    in_text: bool,
    font_resource: Vec<u8>,
    font_name: String,
    font_bold: bool,
    font_size: f32,
    leading: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scaling: f32,
    render_mode: i64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            saved: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            in_text: false,
            font_resource: Vec::new(),
            font_name: String::new(),
            font_bold: false,
            font_size: 12.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            render_mode: 0,
        }
    }
}

impl TextState {
    fn save(&mut self) {
        self.saved.push(self.ctm);
    }

    fn restore(&mut self) {
        if let Some(ctm) = self.saved.pop() {
            self.ctm = ctm;
        }
    }

    fn begin_text(&mut self) {
        self.in_text = true;
        self.text_matrix = Matrix::IDENTITY;
        self.line_matrix = Matrix::IDENTITY;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        // Without a TL operator fall back to the font size as leading
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size.abs()
        };
        self.move_line(0.0, -leading);
    }

    /// Horizontal displacement of a shown string in text space.
    fn string_advance(&self, metrics: &FontMetrics, bytes: &[u8]) -> f32 {
        let word_spacing = metrics.is_single_byte();
        metrics
            .codes(bytes)
            .into_iter()
            .map(|code| {
                let mut tx = metrics.width(code) / 1000.0 * self.font_size + self.char_spacing;
                if word_spacing && code == 32 {
                    tx += self.word_spacing;
                }
                tx * self.horizontal_scaling
            })
            .sum()
    }

    /// Displacement of a TJ array: its strings plus the positioning numbers.
    fn array_advance(&self, metrics: &FontMetrics, items: &[PdfValue]) -> f32 {
        items
            .iter()
            .map(|item| match item {
                PdfValue::Str(bytes) => self.string_advance(metrics, bytes),
                other => {
                    let adjustment = get_number_from_value(other).unwrap_or(0.0);
                    -adjustment / 1000.0 * self.font_size * self.horizontal_scaling
                }
            })
            .sum()
    }
}

/// 3x2 affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn from_operands(operands: &[PdfValue]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let n: Vec<f32> = operands[..6]
            .iter()
            .map(|v| get_number_from_value(v).unwrap_or(0.0))
            .collect();
        Some(Self {
            a: n[0],
            b: n[1],
            c: n[2],
            d: n[3],
            e: n[4],
            f: n[5],
        })
    }

    /// `self × other`
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Length of the transformed unit X vector.
    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    /// Length of the transformed unit Y vector.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}
