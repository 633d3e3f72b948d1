//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for PDF operations, isolating
//! the concrete PDF library (lopdf) from the layout analysis logic.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{Error, Result};
use crate::model::{Outline, OutlineItem};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// `FontDescriptor /Flags` bit for ForceBold (bit 19, 1-based).
const FORCE_BOLD_FLAG: i64 = 1 << 18;

/// Helvetica advance widths for codes 32..=126, in thousandths of an em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 222, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    222, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Helvetica-Bold advance widths for codes 32..=126.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 278, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48-63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80-95
    278, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96-111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112-126
];

/// Width of codes outside the built-in tables.
const STANDARD_DEFAULT_WIDTH: f32 = 556.0;

/// Width of every glyph in the Courier family.
const COURIER_WIDTH: f32 = 600.0;

/// Default `/DW` of a CID font.
const CID_DEFAULT_WIDTH: f32 = 1000.0;

/// Glyph advance widths of a font, in thousandths of an em.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// Bytes per character code: 1 for simple fonts, 2 for Type0 fonts.
    code_len: usize,
    widths: HashMap<u32, f32>,
    /// `(first, last, width)` runs from a CID `/W` array.
    ranges: Vec<(u32, u32, f32)>,
    default_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::standard("Helvetica")
    }
}

impl FontMetrics {
    /// Metrics of a simple font from `/FirstChar`, `/Widths` and `/MissingWidth`.
    pub fn simple(first_char: u32, widths: &[f32], missing_width: f32) -> Self {
        Self {
            code_len: 1,
            widths: (first_char..).zip(widths.iter().copied()).collect(),
            ranges: Vec::new(),
            default_width: missing_width,
        }
    }

    /// Metrics of a two-byte CID font from its `/W` runs and `/DW`.
    pub fn composite(widths: HashMap<u32, f32>, ranges: Vec<(u32, u32, f32)>, default_width: f32) -> Self {
        Self {
            code_len: 2,
            widths,
            ranges,
            default_width,
        }
    }

    /// Built-in metrics for a font without a `/Widths` array.
    ///
    /// Courier is monospaced; every other family is measured with the
    /// Helvetica tables matching its weight.
    pub fn standard(base_font: &str) -> Self {
        let name = base_font.rsplit('+').next().unwrap_or(base_font);
        if name.to_lowercase().contains("courier") {
            return Self::simple(0, &[], COURIER_WIDTH);
        }
        let table = if is_bold_font_name(name) {
            &HELVETICA_BOLD_WIDTHS
        } else {
            &HELVETICA_WIDTHS
        };
        let widths: Vec<f32> = table.iter().map(|&w| w as f32).collect();
        Self::simple(32, &widths, STANDARD_DEFAULT_WIDTH)
    }

    /// Whether codes are single bytes (word spacing only applies to those).
    pub fn is_single_byte(&self) -> bool {
        self.code_len == 1
    }

    /// Split a shown string into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.code_len == 1 {
            return bytes.iter().map(|&b| b as u32).collect();
        }
        bytes
            .chunks(self.code_len)
            .map(|c| c.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
            .collect()
    }

    /// Advance width of one code, in thousandths of an em.
    pub fn width(&self, code: u32) -> f32 {
        if let Some(w) = self.widths.get(&code) {
            return *w;
        }
        self.ranges
            .iter()
            .find(|(first, last, _)| (*first..=*last).contains(&code))
            .map(|(_, _, w)| *w)
            .unwrap_or(self.default_width)
    }
}

/// Font information returned by the backend.
#[derive(Debug, Clone)]
pub struct BackendFontInfo {
    /// Font resource name (key in the page's font dictionary).
    pub name: Vec<u8>,
    /// Base font name (e.g., "Helvetica-Bold").
    pub base_font: String,
    /// Whether the font descriptor declares a bold weight.
    pub descriptor_bold: bool,
    /// Glyph widths used to place consecutive strings.
    pub metrics: FontMetrics,
}

impl BackendFontInfo {
    /// Whether text set in this font should count as bold.
    pub fn is_bold(&self) -> bool {
        self.descriptor_bold || is_bold_font_name(&self.base_font)
    }
}

/// Bold detection from a base font name ("Arial-BoldMT", "ABCDEF+Calibri-Bold").
pub fn is_bold_font_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    ["bold", "black", "heavy", "demi", "semibd", ",bd"]
        .iter()
        .any(|marker| lower.contains(marker))
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Create an operation.
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, font info, content stream
/// decoding and text decoding without exposing any concrete PDF library types.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return font info for a given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Document bookmarks.
    fn outline(&self) -> Outline {
        Outline::new()
    }

    /// Title from the document information dictionary.
    fn title(&self) -> Option<String> {
        None
    }

    /// PDF version string.
    fn version(&self) -> String {
        String::new()
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// LopdfBackend — concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Ok(Self { doc })
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self { doc })
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Follow an indirect reference, if any.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        self.resolve(obj).and_then(|o| o.as_dict().ok())
    }

    fn resolve_array<'a>(&'a self, obj: &'a Object) -> Option<&'a Vec<Object>> {
        self.resolve(obj).and_then(|o| o.as_array().ok())
    }

    fn number(&self, dict: &Dictionary, key: &[u8]) -> Option<f32> {
        dict.get(key)
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(get_number_from_object)
    }

    /// First entry of `/DescendantFonts` of a Type0 font.
    fn descendant_font<'a>(&'a self, font: &'a Dictionary) -> Option<&'a Dictionary> {
        font.get(b"DescendantFonts")
            .ok()
            .and_then(|d| self.resolve_array(d))
            .and_then(|arr| arr.first())
            .and_then(|d| self.resolve_dict(d))
    }

    fn font_descriptor<'a>(&'a self, font: &'a Dictionary) -> Option<&'a Dictionary> {
        font.get(b"FontDescriptor")
            .ok()
            .and_then(|d| self.resolve_dict(d))
            .or_else(|| {
                self.descendant_font(font)
                    .and_then(|d| d.get(b"FontDescriptor").ok())
                    .and_then(|d| self.resolve_dict(d))
            })
    }

    /// Read glyph widths from the font dictionary, falling back to the
    /// built-in metrics for fonts that omit them.
    fn font_metrics(&self, font: &Dictionary, base_font: &str) -> FontMetrics {
        let is_type0 = font
            .get(b"Subtype")
            .and_then(Object::as_name)
            .is_ok_and(|s| s == b"Type0");
        if is_type0 {
            return self.cid_metrics(font);
        }

        let widths = font.get(b"Widths").ok().and_then(|w| self.resolve_array(w));
        let Some(widths) = widths else {
            return FontMetrics::standard(base_font);
        };
        let first_char = self.number(font, b"FirstChar").unwrap_or(0.0).max(0.0) as u32;
        let widths: Vec<f32> = widths
            .iter()
            .map(|w| self.resolve(w).and_then(get_number_from_object).unwrap_or(0.0))
            .collect();
        let missing = self
            .font_descriptor(font)
            .and_then(|d| self.number(d, b"MissingWidth"))
            .unwrap_or(0.0);
        FontMetrics::simple(first_char, &widths, missing)
    }

    /// Parse `/DW` and `/W` of the descendant CID font.
    ///
    /// `/W` mixes `c [w1 w2 ...]` and `c_first c_last w` entries.
    fn cid_metrics(&self, font: &Dictionary) -> FontMetrics {
        let Some(cid_font) = self.descendant_font(font) else {
            return FontMetrics::composite(HashMap::new(), Vec::new(), CID_DEFAULT_WIDTH);
        };
        let default_width = self.number(cid_font, b"DW").unwrap_or(CID_DEFAULT_WIDTH);

        let mut widths = HashMap::new();
        let mut ranges = Vec::new();
        let entries: Vec<&Object> = cid_font
            .get(b"W")
            .ok()
            .and_then(|w| self.resolve_array(w))
            .map(|arr| arr.iter().filter_map(|o| self.resolve(o)).collect())
            .unwrap_or_default();

        let mut i = 0;
        while i < entries.len() {
            let Some(first) = get_number_from_object(entries[i]) else {
                break;
            };
            let first = first.max(0.0) as u32;
            match entries.get(i + 1) {
                Some(Object::Array(list)) => {
                    for (code, w) in (first..).zip(list.iter()) {
                        if let Some(w) = self.resolve(w).and_then(get_number_from_object) {
                            widths.insert(code, w);
                        }
                    }
                    i += 2;
                }
                Some(last) => {
                    let last = get_number_from_object(last);
                    let w = entries.get(i + 2).and_then(|w| get_number_from_object(w));
                    if let (Some(last), Some(w)) = (last, w) {
                        ranges.push((first, last.max(0.0) as u32, w));
                    }
                    i += 3;
                }
                None => break,
            }
        }

        FontMetrics::composite(widths, ranges, default_width)
    }

    /// Check `/FontWeight` and the ForceBold flag of a font descriptor,
    /// looking through `/DescendantFonts` for composite fonts.
    fn descriptor_bold(&self, font: &Dictionary) -> bool {
        let Some(descriptor) = self.font_descriptor(font) else {
            return false;
        };

        let weight = descriptor
            .get(b"FontWeight")
            .ok()
            .and_then(get_number_from_object);
        let flags = descriptor
            .get(b"Flags")
            .ok()
            .and_then(|f| f.as_i64().ok())
            .unwrap_or(0);

        weight.is_some_and(|w| w >= 600.0) || flags & FORCE_BOLD_FLAG != 0
    }

    fn outline_items(&self, first: ObjectId, level: u8, visited: &mut HashSet<ObjectId>) -> Vec<OutlineItem> {
        let pages = self.doc.get_pages();
        let mut items = Vec::new();
        let mut next = Some(first);

        while let Some(item_ref) = next.take() {
            if !visited.insert(item_ref) {
                log::warn!("Outline cycle at object {:?}", item_ref);
                break;
            }
            let Ok(item_dict) = self.doc.get_dictionary(item_ref) else {
                break;
            };

            let title = get_string_from_dict(item_dict, b"Title").unwrap_or_default();
            let page = self.outline_destination(item_dict, &pages);
            let mut item = OutlineItem::new(title, page, level);

            if let Ok(child) = item_dict.get(b"First").and_then(Object::as_reference) {
                item.children = self.outline_items(child, level.saturating_add(1), visited);
            }
            items.push(item);

            next = item_dict.get(b"Next").and_then(Object::as_reference).ok();
        }

        items
    }

    /// Get destination page from an outline item (`/Dest` or `/A /D`).
    fn outline_destination(&self, item: &Dictionary, pages: &BTreeMap<u32, ObjectId>) -> Option<u32> {
        let dest = item.get(b"Dest").ok().or_else(|| {
            item.get(b"A")
                .ok()
                .and_then(|a| self.resolve_dict(a))
                .and_then(|a| a.get(b"D").ok())
        })?;

        let page_ref = self
            .resolve(dest)?
            .as_array()
            .ok()?
            .first()?
            .as_reference()
            .ok()?;

        pages
            .iter()
            .find(|(_, id)| **id == page_ref)
            .map(|(num, _)| *num)
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
        let lopdf_fonts = self.doc.get_page_fonts(page)?;

        let mut result = Vec::with_capacity(lopdf_fonts.len());
        for (name, font_dict) in &lopdf_fonts {
            let base_font = font_dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            let metrics = self.font_metrics(font_dict, &base_font);
            result.push(BackendFontInfo {
                name: name.clone(),
                descriptor_bold: self.descriptor_bold(font_dict),
                base_font,
                metrics,
            });
        }
        Ok(result)
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let contents = page_dict.get(b"Contents")?;

        let stream_bytes = |obj: &Object| -> Option<Vec<u8>> {
            match self.resolve(obj)? {
                Object::Stream(s) => Some(
                    s.decompressed_content()
                        .unwrap_or_else(|_| s.content.clone()),
                ),
                _ => None,
            }
        };

        match self.resolve(contents) {
            Some(Object::Array(arr)) => {
                let mut content = Vec::new();
                for data in arr.iter().filter_map(stream_bytes) {
                    content.extend_from_slice(&data);
                    content.push(b' ');
                }
                Ok(content)
            }
            Some(obj @ Object::Stream(_)) => {
                stream_bytes(obj).ok_or_else(|| Error::PdfParse("Invalid content stream".to_string()))
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content = lopdf::content::Content::decode(data)?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(lopdf_fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = lopdf_fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn outline(&self) -> Outline {
        let mut outline = Outline::new();

        let first = self
            .doc
            .catalog()
            .ok()
            .and_then(|catalog| catalog.get(b"Outlines").ok())
            .and_then(|o| self.resolve_dict(o))
            .and_then(|outlines| outlines.get(b"First").ok())
            .and_then(|f| f.as_reference().ok());

        if let Some(first) = first {
            let mut visited = HashSet::new();
            outline.items = self.outline_items(first, 0, &mut visited);
        }

        outline
    }

    fn title(&self) -> Option<String> {
        let info = self.doc.trailer.get(b"Info").ok()?;
        let info = self.resolve_dict(info)?;
        get_string_from_dict(info, b"Title").filter(|t| !t.trim().is_empty())
    }

    fn version(&self) -> String {
        self.doc.version.to_string()
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

fn get_number_from_object(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}

/// Helper to get a text string from a PDF dictionary.
fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}
