//! JSON output for downstream tooling.
//!
//! Serializes the full [`ExportDocument`], records plus provenance
//! metadata, so consumers that want more than the CSV column set (the
//! preview field, text statistics) get everything in one artifact.

use crate::models::ExportDocument;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Write an [`ExportDocument`] as pretty-printed JSON.
///
/// The file lands at `{output_dir}/{base_name}.json`; the directory is
/// created if missing. Returns the path written.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), base_name))]
pub fn write_document(
    document: &ExportDocument,
    output_dir: &Path,
    base_name: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(document)?;

    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{base_name}.json"));
    fs::write(&path, json)?;
    info!(path = %path.display(), articles = document.article_count, "Wrote JSON document");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleRecord;

    #[test]
    fn test_write_document_roundtrip() {
        let record = ArticleRecord::new(
            "Rubrik".to_string(),
            "Nya Dagen".to_string(),
            "2006-12-29".to_string(),
            "10".to_string(),
            String::new(),
            "http://ret.nu/abc123".to_string(),
            "Brödtext.".to_string(),
        );
        let document = ExportDocument::new("klipp.txt", "text", vec![record]);

        let dir = std::env::temp_dir().join(format!("retriever_clips_json_{}", std::process::id()));
        let path = write_document(&document, &dir, "klipp").unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let back: ExportDocument = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.article_count, 1);
        assert_eq!(back.pipeline, "text");
        assert_eq!(back.articles[0].title, "Rubrik");

        fs::remove_file(&path).unwrap();
        let _ = fs::remove_dir(&dir);
    }
}
