//! Loading options and configuration.

use crate::error::{Error, Result};
use std::ops::RangeInclusive;

/// Options for loading PDF and HTML documents.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Error handling mode for per-page failures
    pub error_mode: ErrorMode,

    /// Page selection (which PDF pages to read)
    pub pages: PageSelection,
}

impl LoadOptions {
    /// Create new load options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail the whole file when any page cannot be read.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Skip unreadable pages and continue.
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

/// Error handling mode during loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any page error
    Strict,
    /// Skip invalid pages and continue
    #[default]
    Lenient,
}

/// Page selection for loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Read all pages
    #[default]
    All,
    /// Read a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Read specific pages (1-indexed)
    Pages(Vec<u32>),
    /// Read several ranges, sorted and non-overlapping
    Ranges(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
            PageSelection::Ranges(ranges) => ranges.iter().any(|r| r.contains(&page)),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        let invalid = || Error::InvalidPageRange(s.to_string());

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start: u32 = start.trim().parse().map_err(|_| invalid())?;
                let end: u32 = end.trim().parse().map_err(|_| invalid())?;
                if start == 0 || start > end {
                    return Err(invalid());
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut ranges: Vec<(u32, u32)> = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            let (start, end) = match part.split_once('-') {
                Some((start, end)) => (
                    start.trim().parse::<u32>().map_err(|_| invalid())?,
                    end.trim().parse::<u32>().map_err(|_| invalid())?,
                ),
                None => {
                    let page = part.parse::<u32>().map_err(|_| invalid())?;
                    (page, page)
                }
            };
            if start == 0 || start > end {
                return Err(invalid());
            }
            ranges.push((start, end));
        }

        // Merge overlapping and adjacent segments
        ranges.sort_unstable();
        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            match merged.last_mut() {
                Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        Ok(PageSelection::Ranges(
            merged.into_iter().map(|(start, end)| start..=end).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_options_builder() {
        let options = LoadOptions::new()
            .strict()
            .with_pages(PageSelection::Range(1..=3));

        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.pages, PageSelection::Range(1..=3));
    }

    #[test]
    fn test_default_options() {
        let options = LoadOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.pages, PageSelection::All);
    }

    #[test]
    fn test_page_selection_includes() {
        let range = PageSelection::Range(5..=10);
        assert!(!range.includes(4));
        assert!(range.includes(5));
        assert!(range.includes(10));
        assert!(!range.includes(11));

        let pages = PageSelection::Pages(vec![1, 3]);
        assert!(pages.includes(3));
        assert!(!pages.includes(2));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(
            PageSelection::parse("1-10").unwrap(),
            PageSelection::Range(1..=10)
        );
        assert_eq!(
            PageSelection::parse("5-7,1,3,3,8").unwrap(),
            PageSelection::Ranges(vec![1..=1, 3..=3, 5..=8])
        );
    }

    #[test]
    fn test_page_selection_huge_list_range() {
        let selection = PageSelection::parse("1,1-4000000000").unwrap();
        assert_eq!(selection, PageSelection::Ranges(vec![1..=4_000_000_000]));
        assert!(selection.includes(3_999_999_999));
        assert!(!selection.includes(0));
    }

    #[test]
    fn test_page_selection_parse_invalid() {
        assert!(matches!(
            PageSelection::parse("x-2"),
            Err(Error::InvalidPageRange(_))
        ));
        assert!(PageSelection::parse("5-2").is_err());
        assert!(PageSelection::parse("0,1").is_err());
        assert!(PageSelection::parse("1,5-2").is_err());
        assert!(PageSelection::parse("1,0-3").is_err());
    }
}
