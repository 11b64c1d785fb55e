//! # Retriever Clips
//!
//! A parser that turns raw exports from the Retriever news-clipping
//! database into structured article records, written out as CSV (and
//! optionally JSON) tables.
//!
//! ## Supported input formats
//!
//! - **PDF exports**: front-matter table-of-contents pages followed by the
//!   articles themselves, with hyperlink annotations pointing at the web
//!   versions
//! - **UTF-16 text exports**: loosely structured plain text where each
//!   article ends in a copyright/boilerplate block
//!
//! ## Usage
//!
//! ```sh
//! retriever_clips klipp.pdf januari.txt -o ./out --json
//! ```
//!
//! ## Architecture
//!
//! Both formats run through the same conceptual pipeline:
//! 1. **Segmentation**: find article boundaries (TOC pages, or a cascade
//!    of end-of-article boilerplate patterns)
//! 2. **Field recovery**: headline, publication, date, page, author, link
//! 3. **Assembly**: ordered [`models::ArticleRecord`]s
//! 4. **Output**: CSV tables with a UTF-8 BOM, optional JSON documents
//!
//! Every vendor- and language-specific marker string lives in the
//! [`lexicon::Lexicon`], overridable from a YAML file.

use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use std::path::Path;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod error;
mod lexicon;
mod models;
mod outputs;
mod pages;
mod pipelines;
mod utils;

use cli::Cli;
use lexicon::Lexicon;
use models::{ArticleRecord, ExportDocument};
use pages::{PageSource, PdfPages};
use pipelines::{pdf, text};
use utils::{ensure_writable_dir, truncate_for_log};

#[instrument]
fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("retriever_clips starting up");

    let args = Cli::parse();

    // Early check: ensure the output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir) {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }
    let output_dir = Path::new(&args.output_dir).to_path_buf();

    let lexicon = match &args.lexicon {
        Some(path) => {
            let lexicon = Lexicon::load(path)?;
            info!(path = %path.display(), "Loaded lexicon override");
            lexicon
        }
        None => Lexicon::default(),
    };

    // ---- Route inputs by format ----
    let mut text_blob = String::new();
    let mut text_files = 0usize;
    let mut failed_files = 0usize;
    let mut total_records = 0usize;

    for input in &args.inputs {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());
        let bytes = match std::fs::read(input) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(file = %name, error = %e, "Failed to read input; skipping");
                failed_files += 1;
                continue;
            }
        };

        let looks_like_pdf = bytes.starts_with(b"%PDF")
            || input.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if looks_like_pdf {
            match process_pdf(&bytes, &name, &lexicon, &output_dir, &args) {
                Ok(count) => total_records += count,
                Err(e) => {
                    error!(file = %name, error = %e, "PDF parse failed; skipping file");
                    failed_files += 1;
                }
            }
        } else {
            match text::decode_export(&bytes, &name) {
                Ok(decoded) => {
                    info!(file = %name, chars = decoded.chars().count(), "Decoded text export");
                    if !text_blob.is_empty() {
                        text_blob.push(' ');
                    }
                    text_blob.push_str(&decoded);
                    text_files += 1;
                }
                Err(e) => {
                    error!(file = %name, error = %e, "Skipping undecodable file");
                    failed_files += 1;
                }
            }
        }
    }

    // ---- Parse the combined text batch ----
    if text_files > 0 {
        let records = text::parse_blob(&text_blob, &lexicon)?;
        log_summary("text batch", &records);
        total_records += records.len();

        outputs::csv::write_records(
            &records,
            outputs::csv::TEXT_COLUMNS,
            &output_dir.join("retriever_text.csv"),
        )?;
        if args.json {
            let label = format!("{text_files} combined text export(s)");
            let document = ExportDocument::new(&label, "text", records);
            outputs::json::write_document(&document, &output_dir, "retriever_text")?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        inputs = args.inputs.len(),
        failed_files,
        total_records,
        "Execution complete"
    );
    if failed_files > 0 {
        warn!(failed_files, "Some inputs were skipped; see errors above");
    }

    Ok(())
}

/// Parse one PDF export and write its artifacts.
///
/// On a parse-level failure the raw text of the first pages is logged as a
/// debugging aid; there is no automatic retry.
#[instrument(level = "info", skip_all, fields(file = %name))]
fn process_pdf(
    bytes: &[u8],
    name: &str,
    lexicon: &Lexicon,
    output_dir: &Path,
    args: &Cli,
) -> Result<usize, Box<dyn Error>> {
    let pages = PdfPages::from_bytes(bytes)?;

    let records = match pdf::parse_document(&pages, lexicon) {
        Ok(records) => records,
        Err(e) => {
            let mut raw = String::new();
            for index in 0..pages.page_count().min(2) {
                if let Ok(page) = pages.page_text(index) {
                    raw.push_str(&page);
                    raw.push('\n');
                }
            }
            error!(
                file = %name,
                raw_preview = %truncate_for_log(&raw, 3000),
                "Raw extracted text of the first pages, for debugging"
            );
            return Err(e.into());
        }
    };

    log_summary(name, &records);

    let base = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "retriever_pdf".to_string());

    outputs::csv::write_records(
        &records,
        outputs::csv::PDF_COLUMNS,
        &output_dir.join(format!("{base}_articles.csv")),
    )?;
    if args.preview {
        outputs::csv::write_records(
            &records,
            outputs::csv::PDF_PREVIEW_COLUMNS,
            &output_dir.join(format!("{base}_preview.csv")),
        )?;
    }

    let count = records.len();
    if args.json {
        let document = ExportDocument::new(name, "pdf", records);
        outputs::json::write_document(&document, output_dir, &format!("{base}_articles"))?;
    }

    Ok(count)
}

/// Log the per-parse extraction statistics.
fn log_summary(label: &str, records: &[ArticleRecord]) {
    let with_text = records.iter().filter(|r| r.has_text).count();
    let with_author = records.iter().filter(|r| !r.author.is_empty()).count();
    let with_url = records.iter().filter(|r| !r.url.is_empty()).count();
    let publications = records.iter().map(|r| r.source.as_str()).unique().count();
    let dates: Vec<&str> = records
        .iter()
        .map(|r| r.date.as_str())
        .filter(|d| !d.is_empty())
        .collect();
    let date_span = match (dates.iter().min(), dates.iter().max()) {
        (Some(first), Some(last)) => format!("{first} → {last}"),
        _ => "n/a".to_string(),
    };

    info!(
        source = label,
        articles = records.len(),
        with_text,
        with_author,
        with_url,
        publications,
        date_span = %date_span,
        "Extraction summary"
    );
}
