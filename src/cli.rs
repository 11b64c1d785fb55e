//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Retriever export parser.
///
/// # Examples
///
/// ```sh
/// # Parse a PDF export into ./out/<stem>_articles.csv
/// retriever_clips klipp.pdf -o ./out
///
/// # Combine several UTF-16 text exports, write CSV + JSON
/// retriever_clips januari.txt februari.txt -o ./out --json
///
/// # Override parts of the marker lexicon
/// retriever_clips klipp.pdf -o ./out --lexicon norsk.yaml
/// ```
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Retriever export files: PDF exports or UTF-16 text exports.
    /// Text files are combined into one batch; PDFs are parsed one by one.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory for the CSV (and optional JSON) artifacts
    #[arg(short, long, default_value = "./out")]
    pub output_dir: String,

    /// Also write the full records as a JSON document
    #[arg(long)]
    pub json: bool,

    /// Also write a preview CSV with body text capped near 1000 characters
    #[arg(long)]
    pub preview: bool,

    /// YAML file overriding parts of the marker lexicon
    #[arg(short, long)]
    pub lexicon: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(&[
            "retriever_clips",
            "klipp.pdf",
            "--output-dir",
            "./artiklar",
            "--json",
        ]);

        assert_eq!(cli.inputs, vec![PathBuf::from("klipp.pdf")]);
        assert_eq!(cli.output_dir, "./artiklar");
        assert!(cli.json);
        assert!(!cli.preview);
        assert!(cli.lexicon.is_none());
    }

    #[test]
    fn test_cli_multiple_inputs_and_short_flags() {
        let cli = Cli::parse_from(&[
            "retriever_clips",
            "januari.txt",
            "februari.txt",
            "-o",
            "/tmp/ut",
            "-l",
            "norsk.yaml",
        ]);

        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.output_dir, "/tmp/ut");
        assert_eq!(cli.lexicon, Some(PathBuf::from("norsk.yaml")));
    }

    #[test]
    fn test_cli_requires_at_least_one_input() {
        assert!(Cli::try_parse_from(&["retriever_clips", "-o", "./out"]).is_err());
    }
}
