//! Data models for extracted news articles.
//!
//! This module defines the structures shared by both extraction pipelines:
//! - [`ArticleRecord`]: One extracted article with metadata and body text
//! - [`ExportDocument`]: Collection of records for a single parsed input
//!
//! Transient pipeline types (TOC entries, the page link index) live next to
//! the code that produces them in [`crate::pipelines::pdf`]; only what
//! reaches the output table is modeled here.

use serde::{Deserialize, Serialize};

/// Maximum number of characters kept in the bounded preview field.
const PREVIEW_CHARS: usize = 1000;

/// One news article extracted from a Retriever export.
///
/// Records are created through [`ArticleRecord::new`], which derives
/// `preview`, `text_length`, `word_count` and `has_text` from the body so
/// the invariant `word_count == 0 ⟺ body is empty` holds for every record.
///
/// # Fields per pipeline
///
/// Both pipelines fill `title`, `source`, `date`, `page`, `url` and `body`.
/// `author` is only recovered by the PDF pipeline; text exports carry no
/// author line, so the field stays empty there.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// The article headline. Never empty for an assembled record.
    pub title: String,
    /// The publication name, or the NA sentinel when unrecoverable.
    pub source: String,
    /// Publication date, `YYYY-MM-DD` when parseable, otherwise the raw
    /// value found in the export (possibly empty).
    pub date: String,
    /// Page designator as printed in the export (may be composite,
    /// e.g. `10#11` for a spread).
    pub page: String,
    /// Byline author. Empty when no qualifying author line was found.
    pub author: String,
    /// Article permalink. Empty when no link could be associated.
    pub url: String,
    /// Full body text, lines joined by single spaces.
    pub body: String,
    /// Body text capped near 1000 characters, for display tables.
    pub preview: String,
    /// Number of characters in `body`.
    pub text_length: usize,
    /// Number of whitespace-separated words in `body`.
    pub word_count: usize,
    /// Whether any body text was recovered.
    pub has_text: bool,
}

impl ArticleRecord {
    /// Build a record, deriving the text statistics from `body`.
    ///
    /// The body is trimmed first so that a whitespace-only body counts as
    /// no text at all.
    pub fn new(
        title: String,
        source: String,
        date: String,
        page: String,
        author: String,
        url: String,
        body: String,
    ) -> Self {
        let body = body.trim().to_string();
        let text_length = body.chars().count();
        let word_count = body.split_whitespace().count();
        let preview = if text_length > PREVIEW_CHARS {
            body.chars().take(PREVIEW_CHARS).collect()
        } else {
            body.clone()
        };
        Self {
            title,
            source,
            date,
            page,
            author,
            url,
            has_text: !body.is_empty(),
            body,
            preview,
            text_length,
            word_count,
        }
    }
}

/// All records extracted from a single parse invocation.
///
/// Serialized as the JSON artifact when `--json` is passed; the CSV writer
/// consumes the `articles` vector directly.
#[derive(Debug, Deserialize, Serialize)]
pub struct ExportDocument {
    /// Local timestamp of the parse, RFC 3339.
    pub generated_at: String,
    /// Name of the input file (or batch label for combined text exports).
    pub source_file: String,
    /// Which pipeline produced the records: `"pdf"` or `"text"`.
    pub pipeline: String,
    /// Number of records in `articles`.
    pub article_count: usize,
    /// The extracted records in source order.
    pub articles: Vec<ArticleRecord>,
}

impl ExportDocument {
    /// Wrap a record list with its provenance metadata.
    pub fn new(source_file: &str, pipeline: &str, articles: Vec<ArticleRecord>) -> Self {
        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            source_file: source_file.to_string(),
            pipeline: pipeline.to_string(),
            article_count: articles.len(),
            articles,
        }
    }
}
