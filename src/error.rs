//! Error types for corpus loading and agreement-data construction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the aggregation and reconciliation core.
#[derive(Debug, Error)]
pub enum IaaError {
    /// The data root does not exist or is not a directory.
    #[error("data root is not a directory: {}", .0.display())]
    InvalidDataRoot(PathBuf),

    /// Neither an explicit list nor discovery produced any annotator.
    #[error("no annotators found under {}", .0.display())]
    NoAnnotators(PathBuf),

    /// An explicitly requested annotator has no directory under the root.
    #[error("annotator '{annotator}' has no directory under {}", .root.display())]
    UnknownAnnotator { annotator: String, root: PathBuf },

    /// The same annotator was listed twice.
    #[error("annotator '{0}' is listed more than once")]
    DuplicateAnnotator(String),

    /// The data root could not be listed.
    #[error("failed to list annotator directories under {}", .root.display())]
    Scan {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The state file could not be read.
    #[error("failed to read state file for '{annotator}' at {}", .path.display())]
    StateRead {
        annotator: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state file is not valid JSON or lacks the `graphs` section.
    #[error("failed to parse state file for '{annotator}' at {}", .path.display())]
    StateParse {
        annotator: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A text's graph does not follow the `graph.now.edges` layout.
    #[error("malformed graph for text '{text}' of annotator '{annotator}': {message}")]
    Schema {
        annotator: String,
        text: String,
        message: String,
    },

    /// The builder was asked for an (annotator, text) pair that was never annotated.
    #[error("annotator '{annotator}' has no annotated edges for text '{text}'")]
    MissingAnnotation { annotator: String, text: String },
}

/// Result alias for the core.
pub type IaaResult<T> = std::result::Result<T, IaaError>;
