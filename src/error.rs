//! Error types for the extraction pipelines.
//!
//! Only failures that abort an entire input are modeled here. Everything
//! that can be recovered locally (a TOC line that doesn't match the entry
//! pattern, a chunk without a publication/date line, a TOC entry whose page
//! number points past the end of the document) degrades to a sentinel
//! value or a skipped record instead of an error, and is logged at
//! `warn!`/`debug!` where it happens.

use thiserror::Error;

/// Failures that abort processing of a single input file.
///
/// A failed file never aborts the whole run: the caller logs the error,
/// skips the file, and continues with the remaining inputs.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The bytes of a text export could not be decoded as UTF-16 or UTF-8.
    #[error("could not decode {name}: not valid UTF-16 (or UTF-8 fallback)")]
    Decode {
        /// Name of the offending file, for per-file reporting.
        name: String,
    },

    /// The PDF document could not be loaded at all (malformed stream,
    /// truncated file, unsupported encryption).
    #[error("failed to load PDF: {0}")]
    PdfLoad(#[source] lopdf::Error),

    /// Text extraction failed for a page that should exist.
    #[error("failed to extract text from page {page}: {source}")]
    PageText {
        /// Zero-based page index.
        page: usize,
        #[source]
        source: lopdf::Error,
    },

    /// A lexicon-supplied pattern did not compile into a valid regex.
    ///
    /// Only reachable with a user-provided lexicon file; the shipped
    /// default lexicon is covered by tests.
    #[error("invalid lexicon pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
