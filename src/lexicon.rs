//! The marker lexicon: every vendor- and language-specific string the
//! segmentation heuristics depend on.
//!
//! The algorithms in [`crate::pipelines`] are language-agnostic; everything
//! Swedish (or specific to the Retriever export tool) lives here as data.
//! The shipped [`Default`] targets Retriever's Swedish exports. A YAML file
//! passed via `--lexicon` overrides any subset of the fields, so a new
//! export variant or another vendor language is a config change, not a
//! code change.
//!
//! # Roles
//!
//! | Field | Used by | Meaning |
//! |-------|---------|---------|
//! | `toc_separator` | TOC extractor | Private-use-area glyph between title and metadata |
//! | `toc_skip_substrings` / `toc_skip_labels` | TOC extractor | Header and section-label lines to drop |
//! | `masthead_substrings` / `datestamp_prefix` | Body extractor | Running header/footer lines |
//! | `section_labels` | Body extractor | One-word labels dropped on continuation pages |
//! | `page_label` | Both pipelines | The page-marker word (`Sida`) |
//! | `copyright_markers` | Body extractor | End-of-article termination markers |
//! | `institution_headers` / `datestamp_label` / `feed_labels` | Text normalizer | Export metadata lines |
//! | `print_boilerplate` | Field parser | Phrases scrubbed from body text |
//! | `link_pattern` | Link collector | Article-permalink URL pattern |
//! | `boundary_patterns` | Article splitter | End-of-article blocks, newest format first |

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;

/// Marker phrases and patterns for one export vendor/language.
///
/// All fields are plain data so the whole struct round-trips through YAML.
/// Fields omitted from an override file keep their shipped default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Separator glyph between a TOC entry's title and its metadata tail.
    pub toc_separator: String,
    /// A TOC line containing any of these is boilerplate, not an entry.
    pub toc_skip_substrings: Vec<String>,
    /// A TOC line exactly equal to one of these is a section label.
    pub toc_skip_labels: Vec<String>,
    /// An article-page line containing any of these is the running masthead.
    pub masthead_substrings: Vec<String>,
    /// An article-page line starting with this is the date-stamp footer.
    pub datestamp_prefix: String,
    /// Continuation-page lines exactly equal to one of these are dropped.
    pub section_labels: Vec<String>,
    /// The page-marker word ("Sida" in Retriever's Swedish exports).
    pub page_label: String,
    /// A line containing any of these terminates body collection.
    pub copyright_markers: Vec<String>,
    /// Institution header lines in text exports; the whole line is removed.
    pub institution_headers: Vec<String>,
    /// Label starting the date-stamp line in text exports.
    pub datestamp_label: String,
    /// Literal labels removed from text exports wherever they occur.
    pub feed_labels: Vec<String>,
    /// Print-edition boilerplate phrases scrubbed from body text.
    pub print_boilerplate: Vec<String>,
    /// Regex matching one article-permalink URL.
    pub link_pattern: String,
    /// End-of-article boundary blocks as regexes, tried in order.
    ///
    /// Newer export formats come first so they win over the legacy
    /// copyright-prefixed variants. Each match is rewritten to the internal
    /// single-character boundary marker before the split.
    pub boundary_patterns: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            toc_separator: "\u{e618}".to_string(),
            toc_skip_substrings: vec![
                "Kandidatuppsats".to_string(),
                "Datum 2026".to_string(),
                "Tidningsartiklar".to_string(),
            ],
            toc_skip_labels: vec![
                "heder, hedersrelaterat".to_string(),
                "Tidningar".to_string(),
                "Tidning".to_string(),
                "Heders".to_string(),
                "Allehanda".to_string(),
                "Socialdemokraten".to_string(),
                "Nyheter".to_string(),
                "Nyheter -".to_string(),
            ],
            masthead_substrings: vec!["Tidningsartiklar - Kandidatuppsats".to_string()],
            datestamp_prefix: "Datum 2026".to_string(),
            section_labels: vec!["Retriever".to_string(), "Nyheter".to_string()],
            page_label: "Sida".to_string(),
            copyright_markers: vec![
                "©".to_string(),
                "Alla artiklar är skyddade".to_string(),
                "Klicka här för att".to_string(),
            ],
            institution_headers: vec!["Linnéuniversitetet".to_string()],
            datestamp_label: "Datum".to_string(),
            feed_labels: vec!["Nyheter:".to_string()],
            print_boilerplate: vec!["Publicerat i print.".to_string()],
            link_pattern: r"http://ret\.nu/\w+".to_string(),
            // the (?:\n+|\z) endings let a boundary block that closes the
            // document match even after trailing blank lines are trimmed
            boundary_patterns: vec![
                r"(?s)Alla artiklar.*?Läs hela artikeln på\s+http://ret\.nu/\w+\s*\n=+\s*(?:\n+|\z)"
                    .to_string(),
                r"Se webartikeln på\s+http://ret\.nu/\w+\s*\n=+\s*(?:\n+|\z)".to_string(),
                r"©.+\n\nLäs hela.+\n=+(?:\n\n|\z)".to_string(),
                r"©.+\n\nSe webartikeln på.+\n=+(?:\n\n|\z)".to_string(),
            ],
        }
    }
}

impl Lexicon {
    /// Load a lexicon override from a YAML file.
    ///
    /// Fields missing from the file fall back to the shipped default.
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path)?;
        let lexicon: Lexicon = serde_yaml::from_str(&raw)?;
        Ok(lexicon)
    }

    /// The separator glyph as a `char`, if the configured string is non-empty.
    pub fn separator(&self) -> Option<char> {
        self.toc_separator.chars().next()
    }

    /// The two page-marker tokens a PDF metadata line may carry
    /// (`"Sida:"` and `"Sida "` under the default lexicon).
    pub fn page_marker_tokens(&self) -> (String, String) {
        (
            format!("{}:", self.page_label),
            format!("{} ", self.page_label),
        )
    }

    /// Regex matching one article-permalink URL.
    pub fn link_regex(&self) -> Result<Regex, regex::Error> {
        Regex::new(&self.link_pattern)
    }

    /// The boundary cascade, compiled in priority order.
    pub fn boundary_regexes(&self) -> Result<Vec<Regex>, regex::Error> {
        self.boundary_patterns.iter().map(|p| Regex::new(p)).collect()
    }

    /// One regex per institution header, each eating the rest of its line.
    pub fn institution_regexes(&self) -> Result<Vec<Regex>, regex::Error> {
        self.institution_headers
            .iter()
            .map(|h| Regex::new(&format!("{}.+", regex::escape(h))))
            .collect()
    }

    /// Regex removing a date-stamp line (label plus the rest of the line).
    pub fn datestamp_regex(&self) -> Result<Regex, regex::Error> {
        Regex::new(&format!(r"{}\s.+", regex::escape(&self.datestamp_label)))
    }

    /// Regex matching a page-marker token (`Sida <digit><rest-of-line>`).
    pub fn page_token_regex(&self) -> Result<Regex, regex::Error> {
        Regex::new(&format!(r"{}\s\d.+", regex::escape(&self.page_label)))
    }

    /// True if `line` is part of the running masthead.
    pub fn is_masthead(&self, line: &str) -> bool {
        self.masthead_substrings.iter().any(|m| line.contains(m))
    }

    /// True if `line` is the date-stamp header/footer.
    pub fn is_datestamp(&self, line: &str) -> bool {
        !self.datestamp_prefix.is_empty() && line.starts_with(&self.datestamp_prefix)
    }

    /// True if `line` carries an end-of-article termination marker.
    pub fn is_termination(&self, line: &str) -> bool {
        self.copyright_markers.iter().any(|m| line.contains(m))
    }

    /// True if `line` is exactly a known section label.
    pub fn is_section_label(&self, line: &str) -> bool {
        self.section_labels.iter().any(|l| l == line)
    }
}
