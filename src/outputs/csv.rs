//! CSV output with spreadsheet-friendly encoding.
//!
//! Files are written with a UTF-8 byte-order mark so Excel and friends
//! pick the right encoding when double-clicked. Column sets are fixed
//! per pipeline and written in declaration order.

use crate::models::ArticleRecord;
use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{info, instrument};

/// UTF-8 byte-order mark, for spreadsheet compatibility.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Full-text column set for PDF-pipeline records.
pub const PDF_COLUMNS: &[&str] = &[
    "Title",
    "Source",
    "Date",
    "Page",
    "Author",
    "URL",
    "Word_Count",
    "Full_Text",
];

/// Preview column set for PDF-pipeline records (body capped near 1000
/// characters).
pub const PDF_PREVIEW_COLUMNS: &[&str] = &[
    "Title",
    "Source",
    "Date",
    "Page",
    "Author",
    "URL",
    "Word_Count",
    "Article_Text",
];

/// Column set for text-pipeline records. Text exports carry no author.
pub const TEXT_COLUMNS: &[&str] = &["rubrik", "tidning", "datum", "sida", "text", "länk"];

/// Look up one record field by column name.
fn column_value(record: &ArticleRecord, column: &str) -> String {
    match column {
        "Title" | "rubrik" => record.title.clone(),
        "Source" | "tidning" => record.source.clone(),
        "Date" | "datum" => record.date.clone(),
        "Page" | "sida" => record.page.clone(),
        "Author" => record.author.clone(),
        "URL" | "länk" => record.url.clone(),
        "Word_Count" => record.word_count.to_string(),
        "Full_Text" | "text" => record.body.clone(),
        "Article_Text" => record.preview.clone(),
        "Has_Text" => record.has_text.to_string(),
        "Text_Length" => record.text_length.to_string(),
        _ => String::new(),
    }
}

/// Write `records` as CSV with the given column set.
///
/// The header row is `columns` verbatim; each record contributes one row
/// in source order.
#[instrument(level = "info", skip_all, fields(path = %path.display(), records = records.len()))]
pub fn write_records(
    records: &[ArticleRecord],
    columns: &[&str],
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(columns)?;
    for record in records {
        writer.write_record(columns.iter().map(|c| column_value(record, c)))?;
    }
    writer.flush()?;

    info!(path = %path.display(), "Wrote CSV table");
    Ok(())
}
