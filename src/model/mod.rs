//! Document model types.
//!
//! This module defines the intermediate representation that bridges the
//! loaders (PDF, HTML) and the subtitle extractor. The model is
//! format-agnostic: both loaders produce the same flat list of text blocks.

mod block;
mod document;
mod subtitle;

pub use block::{Position, TextBlock};
pub use document::{Document, Metadata, Outline, OutlineItem};
pub use subtitle::Subtitle;
