//! Typed layout of an annotator's serialized graph state.
//!
//! Only the parts needed to extract edges and labels are modelled; every
//! other key in the state file is ignored.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Top level of a state file. Texts are kept as raw JSON so that each one
/// can be validated separately and pseudo-texts can be skipped unparsed.
#[derive(Debug, Deserialize)]
pub struct AnnotationState {
    pub graphs: BTreeMap<String, serde_json::Value>,
}

/// Graph data stored for one text.
#[derive(Debug, Deserialize)]
pub struct TextGraph {
    pub graph: GraphVersions,
}

/// Versions of a text graph; only the current one is read.
#[derive(Debug, Deserialize)]
pub struct GraphVersions {
    pub now: GraphSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct GraphSnapshot {
    pub edges: BTreeMap<String, RawEdge>,
}

/// One edge of the annotation graph.
#[derive(Debug, Deserialize)]
pub struct RawEdge {
    /// Ids of all tokens the edge connects, source and target side.
    pub ids: Vec<String>,
    /// Labels attached by the annotator; empty means not annotated.
    pub labels: Vec<String>,
}

impl RawEdge {
    /// Join the source-side token ids into the edge identity.
    pub fn source_key(&self, source_marker: &str, separator: &str) -> String {
        self.ids
            .iter()
            .filter(|id| id.contains(source_marker))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl TextGraph {
    /// Validate one text's raw JSON against the graph layout.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
