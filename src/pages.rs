//! Page-level access to PDF documents.
//!
//! The extraction pipeline only needs three things from a PDF: how many
//! pages it has, the plain text of a page, and the outbound hyperlink URIs
//! annotated on a page. [`PageSource`] is that boundary; the pipeline never
//! touches PDF internals directly, which keeps every stage testable against
//! synthetic page fixtures ([`MemoryPages`]).
//!
//! [`PdfPages`] is the production implementation backed by `lopdf`. Page
//! text is extracted on demand, one page at a time, so a large document
//! never has all of its text in memory at once.

use crate::error::ExtractError;
use encoding_rs::UTF_16BE;
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, instrument};
use url::Url;

/// Read access to an ordered sequence of document pages.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Plain text of the page at `index` (zero-based).
    ///
    /// Out-of-range indices yield an empty string; callers are expected to
    /// stay below [`PageSource::page_count`].
    fn page_text(&self, index: usize) -> Result<String, ExtractError>;

    /// Outbound hyperlink URIs annotated on the page at `index`, in
    /// annotation order. Pages without link annotations yield an empty
    /// list; this never fails.
    fn page_links(&self, index: usize) -> Vec<String>;
}

/// A real PDF document, lazily extracting text per page via `lopdf`.
pub struct PdfPages {
    doc: Document,
    /// (1-based page number, page object id) in document order.
    pages: Vec<(u32, ObjectId)>,
}

impl PdfPages {
    /// Load a document from a file on disk.
    pub fn load(path: &std::path::Path) -> Result<Self, ExtractError> {
        let doc = Document::load(path).map_err(ExtractError::PdfLoad)?;
        Ok(Self::from_document(doc))
    }

    /// Load a document from bytes already in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExtractError> {
        let doc = Document::load_mem(bytes).map_err(ExtractError::PdfLoad)?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages().into_iter().collect::<Vec<_>>();
        debug!(page_count = pages.len(), "Loaded PDF document");
        Self { doc, pages }
    }

    /// Follow a reference to its target object; non-references pass through.
    fn resolve<'a>(&'a self, object: &'a Object) -> &'a Object {
        match object {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(object),
            _ => object,
        }
    }

    /// Decode a PDF text string: UTF-16BE when BOM-prefixed, otherwise
    /// treated as Latin-ish bytes.
    fn decode_pdf_string(bytes: &[u8]) -> String {
        if bytes.starts_with(&[0xFE, 0xFF]) {
            let (text, _, _) = UTF_16BE.decode(bytes);
            text.into_owned()
        } else {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }

    /// Pull the URI out of one link annotation dictionary, if present.
    fn annotation_uri(&self, annotation: &Object) -> Option<String> {
        let Object::Dictionary(dict) = self.resolve(annotation) else {
            return None;
        };
        let action = dict.get(b"A").ok()?;
        let Object::Dictionary(action) = self.resolve(action) else {
            return None;
        };
        let uri = action.get(b"URI").ok()?;
        let Object::String(bytes, _) = self.resolve(uri) else {
            return None;
        };
        let uri = Self::decode_pdf_string(bytes);
        match Url::parse(&uri) {
            Ok(_) => Some(uri),
            Err(e) => {
                debug!(uri = %uri, error = %e, "Skipping unparseable annotation URI");
                None
            }
        }
    }
}

impl PageSource for PdfPages {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[instrument(level = "debug", skip(self))]
    fn page_text(&self, index: usize) -> Result<String, ExtractError> {
        let Some(&(page_number, _)) = self.pages.get(index) else {
            return Ok(String::new());
        };
        self.doc
            .extract_text(&[page_number])
            .map_err(|e| ExtractError::PageText {
                page: index,
                source: e,
            })
    }

    fn page_links(&self, index: usize) -> Vec<String> {
        let Some(&(_, page_id)) = self.pages.get(index) else {
            return Vec::new();
        };
        let Ok(page) = self.doc.get_object(page_id) else {
            return Vec::new();
        };
        let Object::Dictionary(page) = self.resolve(page) else {
            return Vec::new();
        };
        let Ok(annotations) = page.get(b"Annots") else {
            return Vec::new();
        };
        let Object::Array(annotations) = self.resolve(annotations) else {
            return Vec::new();
        };
        annotations
            .iter()
            .filter_map(|a| self.annotation_uri(a))
            .collect()
    }
}

/// An in-memory page sequence for unit tests and synthetic fixtures.
#[derive(Debug, Default)]
pub struct MemoryPages {
    texts: Vec<String>,
    links: Vec<Vec<String>>,
}

impl MemoryPages {
    /// Build a fixture from page texts; no page carries links.
    pub fn from_texts<S: Into<String>>(texts: Vec<S>) -> Self {
        let texts: Vec<String> = texts.into_iter().map(Into::into).collect();
        let links = vec![Vec::new(); texts.len()];
        Self { texts, links }
    }

    /// Attach link URIs to the page at `index`.
    pub fn with_links(mut self, index: usize, uris: Vec<&str>) -> Self {
        if index < self.links.len() {
            self.links[index] = uris.into_iter().map(String::from).collect();
        }
        self
    }
}

impl PageSource for MemoryPages {
    fn page_count(&self) -> usize {
        self.texts.len()
    }

    fn page_text(&self, index: usize) -> Result<String, ExtractError> {
        Ok(self.texts.get(index).cloned().unwrap_or_default())
    }

    fn page_links(&self, index: usize) -> Vec<String> {
        self.links.get(index).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_pages_roundtrip() {
        let pages = MemoryPages::from_texts(vec!["sida ett", "sida två"])
            .with_links(1, vec!["https://example.com/artikel"]);
        assert_eq!(pages.page_count(), 2);
        assert_eq!(pages.page_text(0).unwrap(), "sida ett");
        assert!(pages.page_links(0).is_empty());
        assert_eq!(pages.page_links(1), vec!["https://example.com/artikel"]);
    }

    #[test]
    fn test_memory_pages_out_of_range_is_empty() {
        let pages = MemoryPages::from_texts(vec!["enda sidan"]);
        assert_eq!(pages.page_text(5).unwrap(), "");
        assert!(pages.page_links(5).is_empty());
    }

    #[test]
    fn test_decode_pdf_string_utf16be() {
        // BOM + "ab" in UTF-16BE
        let bytes = [0xFE, 0xFF, 0x00, 0x61, 0x00, 0x62];
        assert_eq!(PdfPages::decode_pdf_string(&bytes), "ab");
    }

    #[test]
    fn test_decode_pdf_string_ascii() {
        assert_eq!(
            PdfPages::decode_pdf_string(b"http://ret.nu/abc123"),
            "http://ret.nu/abc123"
        );
    }
}
