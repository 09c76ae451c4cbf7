//! Annotator discovery under a corpus data root.
//!
//! Every annotator owns one directory directly below the root. When no
//! explicit annotator list is given, directories whose name contains no
//! `.` are taken to be annotators.

use crate::error::{IaaError, IaaResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Configuration for annotator scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Name of the state file inside each annotator directory.
    pub state_file: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            state_file: "state".to_string(),
        }
    }
}

impl From<&crate::config::CorpusConfig> for ScanConfig {
    fn from(config: &crate::config::CorpusConfig) -> Self {
        Self {
            state_file: config.state_file.clone(),
        }
    }
}

/// Scanner for annotator directories.
pub struct AnnotatorScanner {
    config: ScanConfig,
    data_root: PathBuf,
}

impl AnnotatorScanner {
    /// Create a new scanner for `data_root`.
    pub fn new(data_root: PathBuf, config: ScanConfig) -> Self {
        Self { config, data_root }
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Path of the state file belonging to `annotator`.
    pub fn state_path(&self, annotator: &str) -> PathBuf {
        self.data_root.join(annotator).join(&self.config.state_file)
    }

    /// Discover annotator directories, sorted by name.
    pub fn discover(&self) -> IaaResult<Vec<String>> {
        if !self.data_root.is_dir() {
            return Err(IaaError::InvalidDataRoot(self.data_root.clone()));
        }

        let mut annotators = Vec::new();

        for entry in WalkDir::new(&self.data_root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| IaaError::Scan {
                root: self.data_root.clone(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().to_string();

            if !entry.file_type().is_dir() {
                continue;
            }
            if !is_annotator_name(&name) {
                debug!("Skipping non-annotator directory: {}", name);
                continue;
            }

            annotators.push(name);
        }

        Ok(annotators)
    }

    /// Use `explicit` when non-empty, otherwise fall back to discovery.
    ///
    /// Explicit names keep their order, which later fixes the anonymized
    /// coder codes.
    pub fn resolve(&self, explicit: &[String]) -> IaaResult<Vec<String>> {
        if explicit.is_empty() {
            let found = self.discover()?;
            if found.is_empty() {
                return Err(IaaError::NoAnnotators(self.data_root.clone()));
            }
            return Ok(found);
        }

        if !self.data_root.is_dir() {
            return Err(IaaError::InvalidDataRoot(self.data_root.clone()));
        }

        let mut seen = HashSet::new();
        for annotator in explicit {
            if !seen.insert(annotator.as_str()) {
                return Err(IaaError::DuplicateAnnotator(annotator.clone()));
            }
            if !self.data_root.join(annotator).is_dir() {
                return Err(IaaError::UnknownAnnotator {
                    annotator: annotator.clone(),
                    root: self.data_root.clone(),
                });
            }
        }

        Ok(explicit.to_vec())
    }
}

/// Directory names containing a `.` are files or hidden entries, not annotators.
fn is_annotator_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('.')
}
