//! PDF pipeline: TOC-driven article extraction.
//!
//! Retriever PDF exports open with table-of-contents pages listing every
//! article's title, source, date and starting page, followed by the
//! articles themselves. The TOC is the only reliable segmentation signal,
//! so extraction runs in four stages:
//!
//! 1. [`extract_toc`] reads the TOC region into ordered [`TocEntry`]s
//! 2. [`PageLinkIndex::build`] maps each page to its hyperlink URIs
//! 3. [`extract_body`] walks an entry's pages collecting author + body text
//! 4. [`parse_document`] assembles everything into `ArticleRecord`s
//!
//! Each stage takes its inputs as explicit arguments and returns a new
//! value, so every stage can be unit-tested against synthetic page
//! fixtures ([`crate::pages::MemoryPages`]).

use crate::error::ExtractError;
use crate::lexicon::Lexicon;
use crate::models::ArticleRecord;
use crate::pages::PageSource;
use crate::utils::normalize_date;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

/// A trimmed line ending in `YYYY-MM-DD` plus a 1–4 digit page number
/// counts as TOC-like when measuring TOC density.
static TOC_TAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}\s+\d{1,4}$").unwrap());

/// The `<source> <date> <page>` tail of a TOC entry, anchored both ends.
static TOC_ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s+(\d{4}-\d{2}-\d{2})\s+(\d{1,3})$").unwrap());

/// The TOC region never extends past this many pages.
const TOC_SCAN_PAGES: usize = 30;
/// A page with fewer TOC-like lines than this ends the TOC region.
const TOC_DENSITY_FLOOR: usize = 5;
/// Density never ends the TOC region before this page index; early pages
/// of a legitimate TOC can be sparse.
const TOC_MIN_PAGE_INDEX: usize = 4;
/// An article reads at most this many pages past its start page.
const MAX_CONTINUATION_PAGES: usize = 10;
/// Hard cap on retained body text per article.
const MAX_BODY_BYTES: usize = 1 << 20;

/// One table-of-contents entry. `page` is 1-based, as printed in the TOC.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub title: String,
    pub source: String,
    pub date: String,
    pub page: usize,
}

/// Author and body text recovered for one TOC entry.
#[derive(Debug, Default, PartialEq)]
pub struct ExtractedBody {
    /// Byline author, empty when no qualifying line was found.
    pub author: String,
    /// Body lines joined by single spaces.
    pub text: String,
}

/// Page index → ordered hyperlink URIs, one slot per page.
///
/// Built once per document, read-only afterwards.
#[derive(Debug)]
pub struct PageLinkIndex(Vec<Vec<String>>);

impl PageLinkIndex {
    /// Collect the link annotations of every page.
    pub fn build(pages: &dyn PageSource) -> Self {
        Self((0..pages.page_count()).map(|i| pages.page_links(i)).collect())
    }

    /// Links on the page at `index`; empty for pages without links and for
    /// out-of-range indices.
    pub fn links_for(&self, index: usize) -> &[String] {
        self.0.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of indexed links across all pages.
    pub fn total(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }
}

/// Read the table-of-contents region and parse it into ordered entries.
///
/// Pages are scanned in order, accumulating text while counting lines that
/// look like TOC entries (date + page number at line end). The first page
/// at index ≥ 4 where that count drops below 5 marks the start of the
/// article section and ends the scan.
///
/// Within the accumulated text, a line is an entry only if it carries the
/// separator glyph with a non-empty title before it and a
/// `<source> <date> <page>` tail after it. Everything else (boilerplate,
/// section labels, wrapped-title continuations, malformed tails) is
/// dropped silently: a TOC line that doesn't fit the pattern is simply not
/// an article.
#[instrument(level = "info", skip_all)]
pub fn extract_toc(
    pages: &dyn PageSource,
    lexicon: &Lexicon,
) -> Result<Vec<TocEntry>, ExtractError> {
    let Some(separator) = lexicon.separator() else {
        warn!("Lexicon has no TOC separator glyph; no entries can be parsed");
        return Ok(Vec::new());
    };

    let mut toc_text = String::new();
    let scan_limit = TOC_SCAN_PAGES.min(pages.page_count());
    for page_index in 0..scan_limit {
        let text = pages.page_text(page_index)?;
        let toc_like = text
            .lines()
            .filter(|line| TOC_TAIL_RE.is_match(line.trim()))
            .count();
        if toc_like < TOC_DENSITY_FLOOR && page_index >= TOC_MIN_PAGE_INDEX {
            debug!(page_index, toc_like, "TOC region ends");
            break;
        }
        toc_text.push_str(&text);
        toc_text.push('\n');
    }

    let mut entries = Vec::new();
    for raw in toc_text.lines() {
        let line = raw.trim();
        if line.is_empty()
            || lexicon.toc_skip_substrings.iter().any(|s| line.contains(s))
        {
            continue;
        }
        if lexicon.toc_skip_labels.iter().any(|label| label == line) {
            continue;
        }
        let Some((title, rest)) = line.split_once(separator) else {
            continue;
        };
        let title = title.trim();
        if title.is_empty() {
            // continuation of a wrapped title from the previous line
            continue;
        }
        // only the segment up to any further separator belongs to this entry
        let tail = rest.split(separator).next().unwrap_or("").trim();
        if let Some(captures) = TOC_ENTRY_RE.captures(tail) {
            let page = captures[3].parse::<usize>().unwrap_or(0);
            entries.push(TocEntry {
                title: title.to_string(),
                source: captures[1].trim().to_string(),
                date: captures[2].to_string(),
                page,
            });
        }
    }

    info!(entries = entries.len(), "Parsed TOC entries");
    Ok(entries)
}

/// True iff `line` qualifies as a byline author: 1–6 words, under 100
/// characters, not period-terminated, and free of termination boilerplate.
fn qualifies_as_author(line: &str, lexicon: &Lexicon) -> bool {
    let words = line.split_whitespace().count();
    (1..=6).contains(&words)
        && line.chars().count() < 100
        && !line.ends_with('.')
        && !lexicon.is_termination(line)
}

/// Trimmed, non-empty lines of a start page, with running header/footer
/// lines removed.
fn start_page_lines(text: &str, lexicon: &Lexicon) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !lexicon.is_masthead(line) && !lexicon.is_datestamp(line))
        .map(String::from)
        .collect()
}

/// Continuation pages additionally drop page markers and section labels.
fn continuation_page_lines(text: &str, lexicon: &Lexicon) -> Vec<String> {
    let page_prefix = format!("{} ", lexicon.page_label);
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            !lexicon.is_masthead(line)
                && !lexicon.is_datestamp(line)
                && !line.starts_with(&page_prefix)
                && !lexicon.is_section_label(line)
        })
        .map(String::from)
        .collect()
}

/// Recover the author and body text for the TOC entry at `index`.
///
/// Returns `Ok(None)` when the entry's page number falls outside the
/// document; the caller must skip that entry entirely.
///
/// The body starts on the entry's page: lines after the metadata line
/// (the first line carrying both a pipe and a page-marker token), or from
/// the top of the page when no metadata line exists. The line after the
/// metadata line becomes the author iff it passes the byline heuristic.
/// Collection stops at a termination marker, and otherwise continues onto
/// at most [`MAX_CONTINUATION_PAGES`] further pages, never reaching the
/// next entry's start page.
#[instrument(level = "debug", skip_all, fields(index))]
pub fn extract_body(
    pages: &dyn PageSource,
    entries: &[TocEntry],
    index: usize,
    lexicon: &Lexicon,
) -> Result<Option<ExtractedBody>, ExtractError> {
    let entry = &entries[index];
    let Some(start) = entry.page.checked_sub(1) else {
        return Ok(None);
    };
    if start >= pages.page_count() {
        return Ok(None);
    }

    let (colon_token, space_token) = lexicon.page_marker_tokens();
    let lines = start_page_lines(&pages.page_text(start)?, lexicon);

    let metadata_index = lines.iter().position(|line| {
        line.contains('|') && (line.contains(&colon_token) || line.contains(&space_token))
    });

    let mut author = String::new();
    let mut body_lines: Vec<String> = Vec::new();
    let mut body_len = 0usize;
    let mut terminated = false;

    let text_start = match metadata_index {
        Some(meta) => match lines.get(meta + 1) {
            Some(candidate) if qualifies_as_author(candidate, lexicon) => {
                author = candidate.clone();
                meta + 2
            }
            _ => meta + 1,
        },
        // no metadata line: no author, body from the top of the page
        None => 0,
    };

    for line in lines.iter().skip(text_start) {
        if lexicon.is_termination(line) {
            terminated = true;
            break;
        }
        body_len += line.len() + 1;
        body_lines.push(line.clone());
    }

    // Continuation pages, bounded by the next entry's start page.
    let next_start = entries
        .get(index + 1)
        .and_then(|next| next.page.checked_sub(1));
    let mut current = start + 1;
    let mut pages_read = 0usize;
    'pages: while current < pages.page_count() && pages_read < MAX_CONTINUATION_PAGES {
        if let Some(next) = next_start {
            if current >= next {
                break;
            }
        }
        for line in continuation_page_lines(&pages.page_text(current)?, lexicon) {
            if lexicon.is_termination(&line) {
                terminated = true;
                break 'pages;
            }
            if body_len > MAX_BODY_BYTES {
                warn!(
                    index,
                    page = current,
                    "Body exceeds retention cap; truncating article"
                );
                break 'pages;
            }
            body_len += line.len() + 1;
            body_lines.push(line);
        }
        current += 1;
        pages_read += 1;
    }

    debug!(
        index,
        start_page = entry.page,
        lines = body_lines.len(),
        terminated,
        "Collected article body"
    );
    Ok(Some(ExtractedBody {
        author,
        text: body_lines.join(" "),
    }))
}

/// Run the full PDF pipeline: TOC, link index, per-entry bodies, records.
///
/// Entries whose start page falls outside the document are skipped, so the
/// output never has more records than the TOC has entries. Each record's
/// URL is the first hyperlink on its start page, or empty.
#[instrument(level = "info", skip_all)]
pub fn parse_document(
    pages: &dyn PageSource,
    lexicon: &Lexicon,
) -> Result<Vec<ArticleRecord>, ExtractError> {
    let entries = extract_toc(pages, lexicon)?;
    let links = PageLinkIndex::build(pages);
    info!(
        entries = entries.len(),
        pages = pages.page_count(),
        links = links.total(),
        "Starting article extraction"
    );

    let mut records = Vec::with_capacity(entries.len());
    for index in 0..entries.len() {
        let entry = &entries[index];
        let Some(extracted) = extract_body(pages, &entries, index, lexicon)? else {
            warn!(
                index,
                page = entry.page,
                title = %entry.title,
                "TOC entry page is out of document bounds; skipping entry"
            );
            continue;
        };
        let url = entry
            .page
            .checked_sub(1)
            .and_then(|page| links.links_for(page).first())
            .cloned()
            .unwrap_or_default();
        records.push(ArticleRecord::new(
            entry.title.clone(),
            entry.source.clone(),
            normalize_date(&entry.date),
            entry.page.to_string(),
            extracted.author,
            url,
            extracted.text,
        ));
    }

    info!(records = records.len(), "Assembled PDF article records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::MemoryPages;

    fn toc_line(title: &str, source: &str, date: &str, page: usize) -> String {
        format!("{}\u{e618}{} {} {}", title, source, date, page)
    }

    /// Five extra tail-matching lines keep a fixture page TOC-dense.
    fn dense_filler() -> String {
        (0..5)
            .map(|i| format!("utfyllnad 2026-01-0{} {}", i + 1, i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn two_article_fixture() -> MemoryPages {
        let toc_page = format!(
            "Tidningsartiklar - Kandidatuppsats\n{}\n{}\n{}\n",
            toc_line("Hedersrelaterat våld i fokus", "Expressen", "2026-01-02", 5),
            toc_line("Andra artikeln", "Aftonbladet", "2026-01-03", 7),
            dense_filler(),
        );
        let article_a = "Tidningsartiklar - Kandidatuppsats sida 5\n\
                         Hedersrelaterat våld i fokus\n\
                         Expressen | Nyheter | 2026-01-02 | Sida: 5\n\
                         Anna Berg Karlsson\n\
                         Första stycket ur artikeln.\n\
                         Andra stycket ur artikeln.\n";
        let article_a_cont = "Tidningsartiklar - Kandidatuppsats sida 6\n\
                              Sida 6\n\
                              Tredje stycket som fortsätter artikeln.\n\
                              Retriever\n";
        let article_b = "Andra artikeln\n\
                         Aftonbladet | 2026-01-03 | Sida: 7\n\
                         Text som tillhör andra artikeln.\n\
                         © Aftonbladet\n";
        MemoryPages::from_texts(vec![
            toc_page.as_str(),
            "mellansida",
            "mellansida",
            "mellansida",
            article_a,
            article_a_cont,
            article_b,
        ])
        .with_links(4, vec!["http://ret.nu/abc123", "http://ret.nu/extra"])
    }

    #[test]
    fn test_extract_toc_parses_entries_in_order() {
        let pages = two_article_fixture();
        let entries = extract_toc(&pages, &Lexicon::default()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Hedersrelaterat våld i fokus");
        assert_eq!(entries[0].source, "Expressen");
        assert_eq!(entries[0].date, "2026-01-02");
        assert_eq!(entries[0].page, 5);
        assert_eq!(entries[1].page, 7);
    }

    #[test]
    fn test_toc_tail_parse_is_idempotent() {
        // reformatting the parsed fields reproduces the tail substring
        let line = toc_line("En rubrik", "Svenska Dagbladet", "2019-05-11", 42);
        let pages = MemoryPages::from_texts(vec![format!("{}\n{}", line, dense_filler())]);
        let entries = extract_toc(&pages, &Lexicon::default()).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        let tail = line.split('\u{e618}').nth(1).unwrap();
        assert_eq!(
            format!("{} {} {}", entry.source, entry.date, entry.page),
            tail
        );
    }

    #[test]
    fn test_toc_skips_continuations_labels_and_malformed_tails() {
        let text = format!(
            "\u{e618}Expressen 2026-01-02 5\n\
             Tidningar\n\
             rubrik utan separator 2026-01-02 5\n\
             Trasig rad\u{e618}utan datum och sida\n\
             {}\n{}",
            toc_line("Giltig rubrik", "Expressen", "2026-01-02", 5),
            dense_filler(),
        );
        let pages = MemoryPages::from_texts(vec![text]);
        let entries = extract_toc(&pages, &Lexicon::default()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Giltig rubrik");
    }

    #[test]
    fn test_toc_region_ends_at_sparse_page() {
        // a valid entry appearing after the density drop is not a TOC entry
        let toc_page = format!(
            "{}\n{}",
            toc_line("Inom registret", "Expressen", "2026-01-02", 6),
            dense_filler()
        );
        let late_entry = toc_line("Utanför registret", "Expressen", "2026-01-04", 6);
        let pages = MemoryPages::from_texts(vec![
            toc_page.as_str(),
            "gles sida",
            "gles sida",
            "gles sida",
            late_entry.as_str(),
            "artikelsida",
        ]);
        let entries = extract_toc(&pages, &Lexicon::default()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Inom registret");
    }

    #[test]
    fn test_multi_page_article_stops_before_next_entry() {
        let pages = two_article_fixture();
        let lexicon = Lexicon::default();
        let records = parse_document(&pages, &lexicon).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.author, "Anna Berg Karlsson");
        assert!(first.body.contains("Första stycket"));
        assert!(first.body.contains("Tredje stycket som fortsätter"));
        // nothing from page 7 bleeds into the first article
        assert!(!first.body.contains("tillhör andra artikeln"));

        let second = &records[1];
        assert_eq!(second.author, "");
        assert!(second.body.contains("tillhör andra artikeln"));
        assert!(!second.body.contains("©"));
    }

    #[test]
    fn test_first_link_on_start_page_becomes_url() {
        let pages = two_article_fixture();
        let records = parse_document(&pages, &Lexicon::default()).unwrap();
        assert_eq!(records[0].url, "http://ret.nu/abc123");
        assert_eq!(records[1].url, "");
    }

    #[test]
    fn test_out_of_range_entry_is_skipped() {
        let toc_page = format!(
            "{}\n{}\n{}",
            toc_line("Inom dokumentet", "Expressen", "2026-01-02", 5),
            toc_line("Utanför dokumentet", "Expressen", "2026-01-03", 99),
            dense_filler(),
        );
        let pages = MemoryPages::from_texts(vec![
            toc_page.as_str(),
            "mellansida",
            "mellansida",
            "mellansida",
            "Rubrik\nExpressen | Sida: 5\nBrödtext här.\n",
        ]);
        let entries = extract_toc(&pages, &Lexicon::default()).unwrap();
        let records = parse_document(&pages, &Lexicon::default()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(records.len(), 1);
        assert!(records.len() <= entries.len());
        assert_eq!(records[0].title, "Inom dokumentet");
    }

    #[test]
    fn test_seven_word_line_is_never_an_author() {
        let lexicon = Lexicon::default();
        assert!(!qualifies_as_author(
            "Ett två tre fyra fem sex sju",
            &lexicon
        ));
        assert!(qualifies_as_author("Ett två tre fyra fem sex", &lexicon));
    }

    #[test]
    fn test_author_rejects_period_length_and_boilerplate() {
        let lexicon = Lexicon::default();
        assert!(!qualifies_as_author("Anna Berg.", &lexicon));
        assert!(!qualifies_as_author(
            "Alla artiklar är skyddade enligt lag",
            &lexicon
        ));
        let long = format!("Anna {}", "x".repeat(100));
        assert!(!qualifies_as_author(&long, &lexicon));
        assert!(qualifies_as_author("Anna Berg", &lexicon));
    }

    #[test]
    fn test_unqualified_candidate_line_joins_body() {
        let page = "Rubrik\n\
                    Expressen | Sida: 5\n\
                    Detta är en inledande mening i brödtexten.\n\
                    Resten av artikeln.\n";
        let entries = vec![TocEntry {
            title: "Rubrik".to_string(),
            source: "Expressen".to_string(),
            date: "2026-01-02".to_string(),
            page: 2,
        }];
        let fixture = MemoryPages::from_texts(vec!["toc", page]);
        let body = extract_body(&fixture, &entries, 0, &Lexicon::default())
            .unwrap()
            .unwrap();
        assert_eq!(body.author, "");
        assert!(body.text.starts_with("Detta är en inledande mening"));
        assert!(body.text.ends_with("Resten av artikeln."));
    }

    #[test]
    fn test_page_without_metadata_line_collects_from_top() {
        let entries = vec![TocEntry {
            title: "Rubrik".to_string(),
            source: "Expressen".to_string(),
            date: "2026-01-02".to_string(),
            page: 2,
        }];
        let fixture = MemoryPages::from_texts(vec![
            "toc".to_string(),
            "Första raden utan metadata\nAndra raden\n© Expressen\n".to_string(),
        ]);
        let body = extract_body(&fixture, &entries, 0, &Lexicon::default())
            .unwrap()
            .unwrap();
        assert_eq!(body.author, "");
        assert_eq!(body.text, "Första raden utan metadata Andra raden");
    }

    #[test]
    fn test_zero_page_entry_is_out_of_bounds() {
        let entries = vec![TocEntry {
            title: "Rubrik".to_string(),
            source: "Expressen".to_string(),
            date: "2026-01-02".to_string(),
            page: 0,
        }];
        let fixture = MemoryPages::from_texts(vec!["enda sidan"]);
        assert_eq!(
            extract_body(&fixture, &entries, 0, &Lexicon::default()).unwrap(),
            None
        );
    }

    #[test]
    fn test_link_index_covers_every_page() {
        let pages = MemoryPages::from_texts(vec!["a", "b", "c"])
            .with_links(1, vec!["http://ret.nu/xyz987"]);
        let index = PageLinkIndex::build(&pages);
        assert!(index.links_for(0).is_empty());
        assert_eq!(index.links_for(1), ["http://ret.nu/xyz987"]);
        assert!(index.links_for(2).is_empty());
        assert!(index.links_for(99).is_empty());
        assert_eq!(index.total(), 1);
    }
}
