//! Utility functions for date normalization, string truncation, and file
//! system checks.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs;
use tracing::info;

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Normalize a date string to ISO `YYYY-MM-DD` when it parses as a real
/// calendar date; otherwise return the raw (trimmed) value unchanged.
///
/// A value like `2026-13-45` keeps its raw shape rather than being
/// reinterpreted, so downstream consumers can still see what the export
/// contained.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_date(" 2006-12-29 "), "2006-12-29");
/// assert_eq!(normalize_date("2026-13-45"), "2026-13-45");
/// assert_eq!(normalize_date(""), "");
/// ```
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if ISO_DATE_RE.is_match(trimmed) {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    trimmed.to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes (on a character boundary) with
/// an ellipsis and byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.).
pub fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path)?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match fs::File::create(&probe_path) {
        Ok(_) => {
            let _ = fs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
