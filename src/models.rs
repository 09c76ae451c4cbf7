//! Data models for agreement computation.
//!
//! This module contains the core data structures shared between the
//! aggregator, the builder, the statistics module and the report writer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Labels one annotator attached to one edge, keyed by edge identity.
pub type TextEdges = BTreeMap<String, Vec<String>>;

/// Unordered, immutable set of labels attached to one item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    /// Build a label set from any list of labels; duplicates collapse.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of labels present in both sets.
    pub fn intersection_len(&self, other: &LabelSet) -> usize {
        self.0.intersection(&other.0).count()
    }

    /// Number of labels present in either set.
    pub fn union_len(&self, other: &LabelSet) -> usize {
        self.0.union(&other.0).count()
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{{{}}}", joined.join(", "))
    }
}

/// One (coder, item, labels) triple handed to the statistics module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgreementItem {
    /// Anonymized annotator code (`c1`, `c2`, ...).
    pub coder: String,
    /// Edge identity, or a single source token in flexible mode.
    pub item: String,
    /// Labels the coder assigned to the item.
    pub labels: LabelSet,
}

impl AgreementItem {
    pub fn new(coder: impl Into<String>, item: impl Into<String>, labels: LabelSet) -> Self {
        Self {
            coder: coder.into(),
            item: item.into(),
            labels,
        }
    }
}

/// Annotated edges of every annotator, per text.
///
/// Only edges with at least one label are stored, and a text appears under
/// an annotator only if at least one of its edges survived.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregatedCorpus {
    annotators: BTreeMap<String, BTreeMap<String, TextEdges>>,
}

impl AggregatedCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an annotator with the texts that survived filtering.
    ///
    /// An annotator with no surviving texts is still recorded so that the
    /// summary can report it.
    pub fn insert_annotator(&mut self, annotator: impl Into<String>, texts: BTreeMap<String, TextEdges>) {
        self.annotators.insert(annotator.into(), texts);
    }

    /// Annotated edges of `annotator` for `text`, if any.
    pub fn text_edges(&self, annotator: &str, text: &str) -> Option<&TextEdges> {
        self.annotators.get(annotator).and_then(|texts| texts.get(text))
    }

    /// Texts annotated by `annotator`.
    pub fn texts(&self, annotator: &str) -> Option<&BTreeMap<String, TextEdges>> {
        self.annotators.get(annotator)
    }

    /// Annotator names in sorted order.
    pub fn annotators(&self) -> impl Iterator<Item = &str> {
        self.annotators.keys().map(String::as_str)
    }

    pub fn annotator_count(&self) -> usize {
        self.annotators.len()
    }

    /// Total number of labeled edges across all annotators and texts.
    pub fn edge_count(&self) -> usize {
        self.annotators
            .values()
            .flat_map(|texts| texts.values())
            .map(|edges| edges.len())
            .sum()
    }
}

/// How disagreements between annotators are reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationPolicy {
    /// Labels substituted for an item a peer annotated and this annotator did not.
    pub dummy_label: LabelSet,
    /// Split multi-token edges into one item per source token.
    pub flexible: bool,
    /// Pad each annotator with dummy labels for peer-only items.
    pub add_missing: bool,
    /// Separator used inside edge identities.
    pub separator: String,
}

impl Default for ReconciliationPolicy {
    fn default() -> Self {
        Self {
            dummy_label: LabelSet::from_labels(["CORR"]),
            flexible: false,
            add_missing: true,
            separator: "-".to_string(),
        }
    }
}

/// Anonymized code paired with the annotator it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoderEntry {
    pub code: String,
    pub annotator: String,
}

/// The three agreement coefficients reported per text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    /// Average observed agreement across all coder pairs.
    pub avg_agreement: f64,
    /// Davies and Fleiss multi-kappa.
    pub multi_kappa: f64,
    /// Krippendorff's alpha.
    pub alpha: f64,
}

/// Metadata about an agreement run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Text the statistics were computed for.
    pub text: String,
    /// Coders in list order.
    pub coders: Vec<CoderEntry>,
    /// Distance function name.
    pub distance: String,
    pub flexible: bool,
    pub add_missing: bool,
    pub dummy_label: LabelSet,
    /// Number of triples handed to the statistics module.
    pub triples: usize,
    /// Number of distinct items across all coders.
    pub items: usize,
    /// Date and time of the run.
    pub analysis_date: DateTime<Utc>,
}

/// The complete agreement report for one text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementReport {
    pub metadata: ReportMetadata,
    pub coefficients: Coefficients,
}

/// Per-annotator overview used by `--dry-run`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorpusSummary {
    pub annotators: Vec<AnnotatorSummary>,
}

/// Texts and labeled-edge counts for one annotator.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatorSummary {
    pub annotator: String,
    pub texts: Vec<(String, usize)>,
}

impl CorpusSummary {
    /// Creates a summary from an aggregated corpus.
    pub fn from_corpus(corpus: &AggregatedCorpus) -> Self {
        let annotators = corpus
            .annotators()
            .map(|name| AnnotatorSummary {
                annotator: name.to_string(),
                texts: corpus
                    .texts(name)
                    .map(|texts| {
                        texts
                            .iter()
                            .map(|(text, edges)| (text.clone(), edges.len()))
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect();

        Self { annotators }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_corpus() -> AggregatedCorpus {
        let mut corpus = AggregatedCorpus::new();
        let mut beata = BTreeMap::new();
        beata.insert(
            "text6".to_string(),
            TextEdges::from([("s1-s2".to_string(), vec!["OM".to_string()])]),
        );
        corpus.insert_annotator("beata", beata);

        let mut julia = BTreeMap::new();
        julia.insert(
            "text6".to_string(),
            TextEdges::from([
                ("s1-s2".to_string(), vec!["OM".to_string()]),
                ("s3".to_string(), vec!["IR".to_string()]),
            ]),
        );
        corpus.insert_annotator("julia", julia);
        corpus
    }

    #[test]
    fn test_label_set_collapses_duplicates() {
        let labels = LabelSet::from_labels(["OM", "IR", "OM"]);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.iter().collect::<Vec<_>>(), vec!["IR", "OM"]);
        assert_eq!(labels.to_string(), "{IR, OM}");
    }

    #[test]
    fn test_label_set_overlap_counts() {
        let a = LabelSet::from_labels(["A", "B"]);
        let b = LabelSet::from_labels(["B", "C"]);
        assert_eq!(a.intersection_len(&b), 1);
        assert_eq!(a.union_len(&b), 3);
    }

    #[test]
    fn test_label_set_order_independent() {
        assert_eq!(
            LabelSet::from_labels(["X", "Y"]),
            LabelSet::from_labels(["Y", "X"])
        );
    }

    #[test]
    fn test_corpus_lookup() {
        let corpus = sample_corpus();
        assert_eq!(corpus.annotator_count(), 2);
        assert_eq!(corpus.edge_count(), 3);
        assert!(corpus.text_edges("beata", "text6").is_some());
        assert!(corpus.text_edges("beata", "text3").is_none());
        assert!(corpus.text_edges("mats", "text6").is_none());
    }

    #[test]
    fn test_corpus_summary() {
        let summary = CorpusSummary::from_corpus(&sample_corpus());
        assert_eq!(summary.annotators.len(), 2);
        assert_eq!(summary.annotators[0].annotator, "beata");
        assert_eq!(summary.annotators[1].texts, vec![("text6".to_string(), 2)]);
    }

    #[test]
    fn test_default_policy() {
        let policy = ReconciliationPolicy::default();
        assert_eq!(policy.dummy_label, LabelSet::from_labels(["CORR"]));
        assert!(!policy.flexible);
        assert!(policy.add_missing);
        assert_eq!(policy.separator, "-");
    }
}
