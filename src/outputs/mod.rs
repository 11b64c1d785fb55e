//! Output generation modules for the extracted record table.
//!
//! # Submodules
//!
//! - [`csv`]: Tabular export with a UTF-8 BOM for spreadsheet tools
//! - [`json`]: Full [`crate::models::ExportDocument`] for downstream tooling
//!
//! Column order is deterministic and differs per pipeline: PDF exports use
//! the English column set with the author column, text exports use the
//! Swedish column set without it. Consumers rely on this order; nothing
//! here re-sorts records.

pub mod csv;
pub mod json;
