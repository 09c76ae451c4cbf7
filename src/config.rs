//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.graph-iaa.toml` files.

use crate::agreement::Distance;
use crate::cli::OutputFormat;
use crate::models::{LabelSet, ReconciliationPolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".graph-iaa.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Corpus layout settings.
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Agreement task settings.
    #[serde(default)]
    pub task: TaskConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Where the annotations live and how edges are identified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory holding one subdirectory per annotator.
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    /// State file name inside each annotator directory.
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// Token ids containing this marker belong to the source side.
    #[serde(default = "default_source_marker")]
    pub source_marker: String,

    /// Separator joining source token ids into an edge identity.
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Pseudo-texts that are never part of the corpus.
    #[serde(default = "default_excluded_texts")]
    pub excluded_texts: Vec<String>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            state_file: default_state_file(),
            source_marker: default_source_marker(),
            separator: default_separator(),
            excluded_texts: default_excluded_texts(),
        }
    }
}

fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_state_file() -> String {
    "state".to_string()
}

fn default_source_marker() -> String {
    "s".to_string()
}

fn default_separator() -> String {
    "-".to_string()
}

fn default_excluded_texts() -> Vec<String> {
    vec!["examples".to_string()]
}

/// Which text to score and how to reconcile annotators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Text to compute agreement for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Ordered annotator list; empty means every discovered annotator.
    #[serde(default)]
    pub annotators: Vec<String>,

    /// Labels substituted for peer-only items.
    #[serde(default = "default_dummy_label")]
    pub dummy_label: Vec<String>,

    /// Split multi-token edges into single-token items.
    #[serde(default)]
    pub flexible: bool,

    /// Pad annotators with the dummy label for items only a peer annotated.
    #[serde(default = "default_true")]
    pub add_missing: bool,

    /// Distance between label sets.
    #[serde(default)]
    pub distance: Distance,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            text: None,
            annotators: Vec::new(),
            dummy_label: default_dummy_label(),
            flexible: false,
            add_missing: true,
            distance: Distance::default(),
        }
    }
}

fn default_dummy_label() -> Vec<String> {
    vec!["CORR".to_string()]
}

fn default_true() -> bool {
    true
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Format used when writing the report to a file.
    #[serde(default)]
    pub format: OutputFormat,

    /// Decimal places for printed coefficients.
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            precision: default_precision(),
        }
    }
}

fn default_precision() -> usize {
    3
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data_root) = args.data_root {
            self.corpus.data_root = data_root.clone();
        }
        if let Some(ref text) = args.text {
            self.task.text = Some(text.clone());
        }
        if let Some(ref annotators) = args.annotators {
            self.task.annotators = annotators.clone();
        }
        if let Some(ref dummy_label) = args.dummy_label {
            self.task.dummy_label = dummy_label.clone();
        }
        if let Some(distance) = args.distance {
            self.task.distance = distance;
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }

        // Each policy flag has a negated form; neither given keeps the file setting
        if args.flexible {
            self.task.flexible = true;
        } else if args.no_flexible {
            self.task.flexible = false;
        }
        if args.add_missing {
            self.task.add_missing = true;
        } else if args.no_add_missing {
            self.task.add_missing = false;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Reconciliation policy described by the task and corpus settings.
    pub fn policy(&self) -> ReconciliationPolicy {
        ReconciliationPolicy {
            dummy_label: LabelSet::from_labels(self.task.dummy_label.iter().cloned()),
            flexible: self.task.flexible,
            add_missing: self.task.add_missing,
            separator: self.corpus.separator.clone(),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.corpus.state_file, "state");
        assert_eq!(config.corpus.excluded_texts, vec!["examples"]);
        assert_eq!(config.task.dummy_label, vec!["CORR"]);
        assert!(config.task.add_missing);
        assert!(!config.task.flexible);
        assert_eq!(config.task.distance, Distance::Jaccard);
        assert_eq!(config.report.precision, 3);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[corpus]
data_root = "/srv/iaa/data"

[task]
text = "text6"
annotators = ["beata", "julia", "mats"]
add_missing = false
distance = "masi"

[report]
format = "json"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.corpus.data_root, PathBuf::from("/srv/iaa/data"));
        assert_eq!(config.corpus.separator, "-");
        assert_eq!(config.task.text.as_deref(), Some("text6"));
        assert_eq!(config.task.annotators, vec!["beata", "julia", "mats"]);
        assert!(!config.task.add_missing);
        assert_eq!(config.task.distance, Distance::Masi);
        assert_eq!(config.report.format, OutputFormat::Json);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[corpus]"));
        assert!(toml_str.contains("[task]"));
        assert!(toml_str.contains("[report]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.task.dummy_label, vec!["CORR"]);
    }

    #[test]
    fn test_merge_with_args_overrides_only_given_values() {
        let mut config: Config = toml::from_str(
            r#"
[task]
text = "text3"
annotators = ["beata", "elena", "julia"]
add_missing = true
"#,
        )
        .unwrap();

        let args = Args::parse_from([
            "graph-iaa",
            "--text",
            "text6",
            "--no-add-missing",
            "--flexible",
        ]);
        config.merge_with_args(&args);

        assert_eq!(config.task.text.as_deref(), Some("text6"));
        assert_eq!(config.task.annotators, vec!["beata", "elena", "julia"]);
        assert!(!config.task.add_missing);
        assert!(config.task.flexible);
    }

    #[test]
    fn test_no_flexible_overrides_file_setting() {
        let mut config: Config = toml::from_str("[task]\nflexible = true\n").unwrap();

        config.merge_with_args(&Args::parse_from(["graph-iaa"]));
        assert!(config.task.flexible);

        config.merge_with_args(&Args::parse_from(["graph-iaa", "--no-flexible"]));
        assert!(!config.task.flexible);
    }

    #[test]
    fn test_verbose_from_config_file_enables_debug() {
        let mut config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        let args = Args::parse_from(["graph-iaa"]);
        config.merge_with_args(&args);

        assert!(config.general.verbose);
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);

        let quiet = Args::parse_from(["graph-iaa", "--quiet"]);
        assert_eq!(quiet.log_level(config.general.verbose), tracing::Level::ERROR);
    }

    #[test]
    fn test_policy_from_config() {
        let mut config = Config::default();
        config.task.dummy_label = vec!["NONE".to_string()];
        config.corpus.separator = "+".to_string();

        let policy = config.policy();
        assert_eq!(policy.dummy_label, LabelSet::from_labels(["NONE"]));
        assert_eq!(policy.separator, "+");
    }
}
