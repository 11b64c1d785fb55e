//! Extraction pipelines for the two Retriever export formats.
//!
//! Both pipelines share the same conceptual shape (segment the input,
//! recover per-article fields, assemble records) but differ in how
//! article boundaries are found:
//!
//! | Format | Module | Segmentation | Notes |
//! |--------|--------|--------------|-------|
//! | PDF export | [`pdf`] | Table-of-contents pages | Start page per article, continuation bounded by the next entry |
//! | UTF-16 text export | [`text`] | Boundary-pattern cascade | End-of-article boilerplate rewritten to a split marker |
//!
//! # Common Patterns
//!
//! Each pipeline module exports one entry point returning ordered
//! [`crate::models::ArticleRecord`]s:
//! - [`pdf::parse_document`] for a loaded [`crate::pages::PageSource`]
//! - [`text::parse_blob`] for a decoded text blob
//!
//! Pipelines share:
//! - The marker [`crate::lexicon::Lexicon`] for every vendor/language string
//! - Local recovery for structural mismatches (sentinel values, skipped
//!   entries) instead of aborting the parse
//! - Source ordering preserved end to end; no re-sorting anywhere

pub mod pdf;
pub mod text;
