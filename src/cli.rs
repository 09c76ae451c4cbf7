//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Values left unset here fall back to the
//! configuration file.

use crate::agreement::Distance;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// graph-iaa - inter-annotator agreement for graph-annotated texts
///
/// Collects the labeled edges of every annotator, reconciles missing
/// annotations, and reports average observed agreement, multi-kappa and
/// Krippendorff's alpha for one text.
///
/// Examples:
///   graph-iaa --data-root ./data --text text6 --annotators beata,julia,mats
///   graph-iaa --data-root ./data --text text3 --flexible --no-add-missing
///   graph-iaa --data-root ./data --dry-run
///   graph-iaa --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory holding one subdirectory per annotator
    #[arg(short, long, value_name = "DIR", env = "GRAPH_IAA_DATA")]
    pub data_root: Option<PathBuf>,

    /// Text to compute agreement for
    #[arg(short, long, value_name = "TEXT")]
    pub text: Option<String>,

    /// Ordered annotator names (comma-separated)
    ///
    /// Order fixes the anonymized codes: the first name becomes c1.
    /// Defaults to every annotator directory found under the data root.
    #[arg(short, long, value_name = "NAMES", value_delimiter = ',')]
    pub annotators: Option<Vec<String>>,

    /// Labels substituted for items a peer annotated (comma-separated)
    #[arg(long, value_name = "LABELS", value_delimiter = ',')]
    pub dummy_label: Option<Vec<String>>,

    /// Split multi-token edges into one item per source token
    #[arg(long, conflicts_with = "no_flexible")]
    pub flexible: bool,

    /// Keep multi-token edges as single items
    #[arg(long, conflicts_with = "flexible")]
    pub no_flexible: bool,

    /// Pad annotators with the dummy label for peer-only items
    #[arg(long, conflicts_with = "no_add_missing")]
    pub add_missing: bool,

    /// Only compare items each annotator labeled
    #[arg(long, conflicts_with = "add_missing")]
    pub no_add_missing: bool,

    /// Distance between label sets
    #[arg(long, value_name = "DISTANCE")]
    pub distance: Option<Distance>,

    /// Output format for --output (text, json, markdown)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Also write the report to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .graph-iaa.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: aggregate the corpus and print what was found
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .graph-iaa.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON format
    Json,
    /// Markdown format
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref text) = self.text {
            if text.trim().is_empty() {
                return Err("Text id must not be empty".to_string());
            }
        }

        if let Some(ref annotators) = self.annotators {
            if annotators.iter().any(|a| a.trim().is_empty()) {
                return Err("Annotator names must not be empty".to_string());
            }
        }

        if let Some(ref labels) = self.dummy_label {
            if labels.is_empty() || labels.iter().any(|l| l.trim().is_empty()) {
                return Err("Dummy label must contain at least one non-empty label".to_string());
            }
        }

        if let Some(ref data_root) = self.data_root {
            if !data_root.exists() {
                return Err(format!(
                    "Data root does not exist: {}",
                    data_root.display()
                ));
            }
            if !data_root.is_dir() {
                return Err(format!(
                    "Data root is not a directory: {}",
                    data_root.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `[general] verbose` setting; `--quiet` wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
