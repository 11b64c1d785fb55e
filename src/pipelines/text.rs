//! Text pipeline: boundary-cascade article extraction.
//!
//! Retriever's plain-text exports are UTF-16 blobs in which each article
//! ends with a copyright/boilerplate block followed by a `===` rule. The
//! pipeline runs in five stages:
//!
//! 1. [`decode_export`] decodes a file (UTF-16, UTF-8 fallback)
//! 2. [`normalize`] scrubs line endings, export metadata, and literal pipes
//! 3. [`collect_links`] harvests every article permalink, in order
//! 4. [`split_articles`] rewrites end-of-article blocks to a marker and splits
//! 5. [`parse_fields`] + [`assemble`] turn chunks and links into records
//!
//! The pipe character is reserved as the internal boundary marker, which is
//! why [`normalize`] scrubs literal pipes before the cascade runs: a stray
//! pipe in the source text would otherwise corrupt the split.
//!
//! Link association is purely positional: chunk *i* gets harvested link
//! *i*. The cursor advances per chunk, including degenerate chunks, so a
//! candidate dropped for having no headline never shifts the association
//! of later articles.

use crate::error::ExtractError;
use crate::lexicon::Lexicon;
use crate::models::ArticleRecord;
use crate::utils::normalize_date;
use encoding_rs::UTF_16LE;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

/// Internal article-boundary marker; literal pipes are scrubbed from the
/// source text before this is ever introduced.
const BOUNDARY_MARKER: &str = "|";

/// Sentinel publication value when no publication/date line was found.
const NA_SENTINEL: &str = "NA";

/// Body text starts at this line of a chunk; lines 1–2 are the
/// publication/date line and layout separators of the export format.
const BODY_START_LINE: usize = 3;

/// A `<publication>, <date>` line anywhere in a chunk (first match wins).
static DATE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n.+,\s\d+-\d+-\d+").unwrap());

/// Fields recovered from one raw article chunk.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedFields {
    pub headline: String,
    pub publication: String,
    pub date: String,
    pub page: String,
    pub body: String,
}

/// Decode one text export: UTF-16 (BOM-aware) with a UTF-8 fallback.
///
/// # Errors
///
/// [`ExtractError::Decode`] when the bytes decode under neither encoding;
/// the caller reports the file by name and continues with the rest.
pub fn decode_export(bytes: &[u8], name: &str) -> Result<String, ExtractError> {
    let (decoded, _, had_errors) = UTF_16LE.decode(bytes);
    if !had_errors {
        return Ok(decoded.into_owned());
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => {
            warn!(file = name, "Expected UTF-16; decoded as UTF-8 fallback");
            Ok(text.to_string())
        }
        Err(_) => Err(ExtractError::Decode {
            name: name.to_string(),
        }),
    }
}

/// Normalize a decoded blob for segmentation.
///
/// Line-ending variants collapse to `\n`; institution headers, date-stamp
/// lines and feed labels are removed; leading/trailing blank lines are
/// trimmed; literal pipes are scrubbed so the boundary marker stays
/// unambiguous.
#[instrument(level = "debug", skip_all)]
pub fn normalize(blob: &str, lexicon: &Lexicon) -> Result<String, ExtractError> {
    let mut text = blob.replace("\r\n", "\n").replace('\r', "\n");
    for pattern in lexicon.institution_regexes()? {
        text = pattern.replace_all(&text, "").into_owned();
    }
    text = lexicon
        .datestamp_regex()?
        .replace_all(&text, "")
        .into_owned();
    for label in &lexicon.feed_labels {
        text = text.replace(label.as_str(), "");
    }
    let text = text.trim_matches('\n');
    Ok(text.replace(BOUNDARY_MARKER, ""))
}

/// Harvest every article-permalink URL from the normalized blob, in order.
///
/// The order is assumed to correspond 1:1 with the order of split chunks;
/// a count mismatch degrades gracefully during assembly.
pub fn collect_links(text: &str, lexicon: &Lexicon) -> Result<Vec<String>, ExtractError> {
    let links = lexicon
        .link_regex()?
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    Ok(links)
}

/// Apply the boundary cascade and split the blob into article chunks.
///
/// Each pattern rewrites a recognized end-of-article block to the boundary
/// marker; patterns run in priority order so newer export formats win over
/// the legacy variants. The chunk after the final marker is typically
/// empty and parses as a degenerate candidate.
#[instrument(level = "debug", skip_all)]
pub fn split_articles(text: &str, lexicon: &Lexicon) -> Result<Vec<String>, ExtractError> {
    let mut text = text.to_string();
    for pattern in lexicon.boundary_regexes()? {
        text = pattern.replace_all(&text, BOUNDARY_MARKER).into_owned();
    }
    Ok(text.split(BOUNDARY_MARKER).map(String::from).collect())
}

/// Recover the fields of one raw article chunk.
///
/// The page token is matched and removed first; the publication/date line
/// is matched anywhere in the chunk (first match wins). Line 0 of what
/// remains is the headline, and everything from line 3 on, joined by
/// spaces, is the body with print-edition boilerplate scrubbed. A chunk
/// without a publication/date line gets the NA sentinel instead of
/// failing.
pub fn parse_fields(chunk: &str, lexicon: &Lexicon) -> Result<ParsedFields, ExtractError> {
    let date_line = DATE_LINE_RE
        .find(chunk)
        .map(|m| m.as_str().trim().to_string());

    let (page, remainder) = match lexicon.page_token_regex()?.find(chunk) {
        Some(found) => {
            let token = found.as_str();
            let spaced_prefix = format!("{} ", lexicon.page_label);
            let page = token
                .strip_prefix(&spaced_prefix)
                .or_else(|| token.strip_prefix(&lexicon.page_label))
                .unwrap_or(token)
                .trim()
                .to_string();
            let mut rest = String::with_capacity(chunk.len() - token.len());
            rest.push_str(&chunk[..found.start()]);
            rest.push_str(&chunk[found.end()..]);
            (page, rest)
        }
        None => (String::new(), chunk.to_string()),
    };

    let (publication, date) = match date_line {
        Some(line) => split_publication_date(&line),
        None => (NA_SENTINEL.to_string(), String::new()),
    };

    let lines: Vec<&str> = remainder.split('\n').collect();
    let headline = lines.first().map(|l| l.trim()).unwrap_or("").to_string();
    let mut body = if lines.len() > BODY_START_LINE {
        lines[BODY_START_LINE..].join(" ")
    } else {
        String::new()
    };
    for phrase in &lexicon.print_boilerplate {
        body = body.replace(phrase.as_str(), "");
    }

    Ok(ParsedFields {
        headline,
        publication,
        date,
        page,
        body,
    })
}

/// Split a `<publication>, <date>` line into its two fields.
///
/// Publication names can themselves contain a comma; with more than two
/// segments the first two are merged back together.
fn split_publication_date(line: &str) -> (String, String) {
    let segments: Vec<&str> = line.split(',').collect();
    match segments.len() {
        0 => (String::new(), String::new()),
        1 => (segments[0].trim().to_string(), String::new()),
        2 => (
            segments[0].trim().to_string(),
            segments[1].trim().to_string(),
        ),
        _ => (
            format!("{}{}", segments[0], segments[1]).trim().to_string(),
            segments[2].trim().to_string(),
        ),
    }
}

/// Zip parsed chunks with harvested links by position and build records.
///
/// Candidates without a headline are dropped here, after their link slot
/// has been consumed, so later associations never shift. Chunks beyond the
/// harvested-link count get an empty link.
pub fn assemble(fields: Vec<ParsedFields>, links: &[String]) -> Vec<ArticleRecord> {
    let mut records = Vec::new();
    for (index, parsed) in fields.into_iter().enumerate() {
        let url = links.get(index).cloned().unwrap_or_default();
        if parsed.headline.is_empty() {
            debug!(chunk = index, "Dropping candidate without a headline");
            continue;
        }
        records.push(ArticleRecord::new(
            parsed.headline,
            parsed.publication,
            normalize_date(&parsed.date),
            parsed.page,
            String::new(),
            url,
            parsed.body,
        ));
    }
    records
}

/// Run the full text pipeline over a decoded (possibly concatenated) blob.
#[instrument(level = "info", skip_all)]
pub fn parse_blob(blob: &str, lexicon: &Lexicon) -> Result<Vec<ArticleRecord>, ExtractError> {
    let text = normalize(blob, lexicon)?;
    let links = collect_links(&text, lexicon)?;
    let chunks = split_articles(&text, lexicon)?;
    info!(
        links = links.len(),
        chunks = chunks.len(),
        "Segmented text export"
    );
    if chunks.len() != links.len() + 1 {
        warn!(
            links = links.len(),
            chunks = chunks.len(),
            "Link/chunk counts diverge; records past the link count get no link"
        );
    }

    let fields = chunks
        .iter()
        .map(|chunk| parse_fields(chunk, lexicon))
        .collect::<Result<Vec<_>, _>>()?;
    let records = assemble(fields, &links);
    info!(records = records.len(), "Assembled text article records");
    Ok(records)
}
