//! Corpus aggregation.
//!
//! Reads every annotator's state file and flattens it into
//! annotator -> text -> edge identity -> labels, keeping only edges that
//! carry at least one label.

use crate::error::{IaaError, IaaResult};
use crate::models::{AggregatedCorpus, TextEdges};
use crate::scanner::AnnotatorScanner;
use crate::schema::{AnnotationState, TextGraph};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// How edge identities are derived and which texts are skipped.
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Token ids containing this marker belong to the source side.
    pub source_marker: String,
    /// Separator joining source ids into an edge identity.
    pub separator: String,
    /// Pseudo-texts to leave out.
    pub excluded_texts: Vec<String>,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            source_marker: "s".to_string(),
            separator: "-".to_string(),
            excluded_texts: vec!["examples".to_string()],
        }
    }
}

impl From<&crate::config::CorpusConfig> for AggregateOptions {
    fn from(config: &crate::config::CorpusConfig) -> Self {
        Self {
            source_marker: config.source_marker.clone(),
            separator: config.separator.clone(),
            excluded_texts: config.excluded_texts.clone(),
        }
    }
}

/// Aggregate the annotated edges of `annotators`.
///
/// Any unreadable or malformed state file aborts the whole aggregation.
pub fn aggregate(
    scanner: &AnnotatorScanner,
    annotators: &[String],
    options: &AggregateOptions,
    show_progress: bool,
) -> IaaResult<AggregatedCorpus> {
    info!(
        "Aggregating {} annotators from {}",
        annotators.len(),
        scanner.data_root().display()
    );

    let progress_bar = if show_progress {
        let pb = ProgressBar::new(annotators.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .map(|style| style.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut corpus = AggregatedCorpus::new();

    for annotator in annotators {
        progress_bar.set_message(annotator.clone());
        let path = scanner.state_path(annotator);
        let texts = load_annotator(annotator, &path, options)?;
        debug!("{}: {} annotated texts", annotator, texts.len());
        corpus.insert_annotator(annotator.clone(), texts);
        progress_bar.inc(1);
    }

    progress_bar.finish_and_clear();
    info!(
        "Aggregated {} labeled edges across {} annotators",
        corpus.edge_count(),
        corpus.annotator_count()
    );

    Ok(corpus)
}

/// Read and flatten one annotator's state file.
pub fn load_annotator(
    annotator: &str,
    path: &Path,
    options: &AggregateOptions,
) -> IaaResult<BTreeMap<String, TextEdges>> {
    let content = std::fs::read_to_string(path).map_err(|source| IaaError::StateRead {
        annotator: annotator.to_string(),
        path: path.to_path_buf(),
        source,
    })?;

    let state: AnnotationState =
        serde_json::from_str(&content).map_err(|source| IaaError::StateParse {
            annotator: annotator.to_string(),
            path: path.to_path_buf(),
            source,
        })?;

    flatten_state(annotator, state, options)
}

/// Flatten a parsed state into text -> edge identity -> labels.
pub fn flatten_state(
    annotator: &str,
    state: AnnotationState,
    options: &AggregateOptions,
) -> IaaResult<BTreeMap<String, TextEdges>> {
    let mut texts = BTreeMap::new();

    for (text, raw) in state.graphs {
        if options.excluded_texts.contains(&text) {
            debug!("{}: skipping excluded text '{}'", annotator, text);
            continue;
        }

        let graph = TextGraph::from_value(raw).map_err(|e| IaaError::Schema {
            annotator: annotator.to_string(),
            text: text.clone(),
            message: e.to_string(),
        })?;

        let edges = collect_text_edges(annotator, &text, graph, options);
        if edges.is_empty() {
            debug!("{}: no annotated edges in '{}'", annotator, text);
            continue;
        }

        texts.insert(text, edges);
    }

    Ok(texts)
}

/// Keep the labeled edges of one text, keyed by their source-side identity.
fn collect_text_edges(
    annotator: &str,
    text: &str,
    graph: TextGraph,
    options: &AggregateOptions,
) -> TextEdges {
    let mut edges = TextEdges::new();

    for (edge_id, edge) in graph.graph.now.edges {
        // An unlabeled edge means no annotation was made, not agreement
        if edge.labels.is_empty() {
            continue;
        }

        let key = edge.source_key(&options.source_marker, &options.separator);
        if let Some(previous) = edges.insert(key.clone(), edge.labels) {
            warn!(
                "{}: edge '{}' in '{}' collapses onto source key '{}', replacing labels {:?}",
                annotator, edge_id, text, key, previous
            );
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ScanConfig;
    use serde_json::json;
    use tempfile::TempDir;

    fn state_json() -> serde_json::Value {
        json!({
            "mode": "anonymize",
            "graphs": {
                "examples": { "anything": "goes here" },
                "text6": {
                    "graph": {
                        "now": {
                            "edges": {
                                "e-s1-s2-t1": { "ids": ["s1", "s2", "t1"], "labels": ["OM"] },
                                "e-s3-t2": { "ids": ["s3", "t2"], "labels": [] },
                                "e-t5": { "ids": ["t5"], "labels": ["M-ADD"] }
                            }
                        }
                    }
                },
                "text7": {
                    "graph": {
                        "now": {
                            "edges": {
                                "e-s1-t1": { "ids": ["s1", "t1"], "labels": [] }
                            }
                        }
                    }
                }
            }
        })
    }

    fn parse(value: serde_json::Value) -> IaaResult<BTreeMap<String, TextEdges>> {
        let state: AnnotationState = serde_json::from_value(value).unwrap();
        flatten_state("beata", state, &AggregateOptions::default())
    }

    #[test]
    fn test_unlabeled_edges_are_dropped() {
        let texts = parse(state_json()).unwrap();
        let edges = &texts["text6"];

        assert_eq!(edges.len(), 2);
        assert_eq!(edges["s1-s2"], vec!["OM"]);
        assert!(edges.values().all(|labels| !labels.is_empty()));
    }

    #[test]
    fn test_text_without_labeled_edges_is_omitted() {
        let texts = parse(state_json()).unwrap();
        assert!(!texts.contains_key("text7"));
    }

    #[test]
    fn test_examples_text_is_excluded() {
        let texts = parse(state_json()).unwrap();
        assert!(!texts.contains_key("examples"));
    }

    #[test]
    fn test_edge_without_source_ids_uses_empty_key() {
        let texts = parse(state_json()).unwrap();
        assert_eq!(texts["text6"][""], vec!["M-ADD"]);
    }

    #[test]
    fn test_colliding_source_keys_keep_last_edge() {
        let texts = parse(json!({
            "graphs": {
                "text1": { "graph": { "now": { "edges": {
                    "e1": { "ids": ["s1", "t1"], "labels": ["W"] },
                    "e2": { "ids": ["s1", "t2"], "labels": ["S-R"] }
                } } } }
            }
        }))
        .unwrap();
        assert_eq!(texts["text1"]["s1"], vec!["S-R"]);
    }

    #[test]
    fn test_malformed_text_is_schema_error() {
        let result = parse(json!({
            "graphs": { "text1": { "graph": { "then": {} } } }
        }));
        match result {
            Err(IaaError::Schema { annotator, text, message }) => {
                assert_eq!(annotator, "beata");
                assert_eq!(text, "text1");
                assert!(message.contains("now"));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_marker_and_separator() {
        let state: AnnotationState = serde_json::from_value(json!({
            "graphs": { "t": { "graph": { "now": { "edges": {
                "e1": { "ids": ["src1", "src2", "tgt1"], "labels": ["X"] }
            } } } } }
        }))
        .unwrap();
        let options = AggregateOptions {
            source_marker: "src".to_string(),
            separator: "+".to_string(),
            excluded_texts: Vec::new(),
        };
        let texts = flatten_state("a", state, &options).unwrap();
        assert_eq!(texts["t"]["src1+src2"], vec!["X"]);
    }

    #[test]
    fn test_aggregate_reads_annotator_directories() {
        let root = TempDir::new().unwrap();
        for name in ["beata", "julia"] {
            std::fs::create_dir(root.path().join(name)).unwrap();
            std::fs::write(root.path().join(name).join("state"), state_json().to_string()).unwrap();
        }

        let scanner = AnnotatorScanner::new(root.path().to_path_buf(), ScanConfig::default());
        let annotators = vec!["beata".to_string(), "julia".to_string()];
        let corpus = aggregate(&scanner, &annotators, &AggregateOptions::default(), false).unwrap();

        assert_eq!(corpus.annotator_count(), 2);
        assert_eq!(corpus.edge_count(), 4);
        assert!(corpus.text_edges("julia", "text6").is_some());
    }

    #[test]
    fn test_missing_state_file_is_read_error() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("mats")).unwrap();

        let scanner = AnnotatorScanner::new(root.path().to_path_buf(), ScanConfig::default());
        let result = aggregate(&scanner, &["mats".to_string()], &AggregateOptions::default(), false);
        assert!(matches!(result, Err(IaaError::StateRead { .. })));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("mats")).unwrap();
        std::fs::write(root.path().join("mats").join("state"), "{ not json").unwrap();

        let scanner = AnnotatorScanner::new(root.path().to_path_buf(), ScanConfig::default());
        let result = aggregate(&scanner, &["mats".to_string()], &AggregateOptions::default(), false);
        assert!(matches!(result, Err(IaaError::StateParse { .. })));
    }
}
