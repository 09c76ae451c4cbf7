//! Agreement-data construction.
//!
//! Turns the aggregated corpus into the flat (coder, item, labels) list
//! consumed by the statistics module, applying the reconciliation policy:
//! anonymized coder codes, optional splitting of multi-token edges, and
//! optional dummy-label padding for items only a peer annotated.

use crate::error::{IaaError, IaaResult};
use crate::models::{AggregatedCorpus, AgreementItem, CoderEntry, LabelSet, ReconciliationPolicy, TextEdges};
use std::collections::HashSet;
use tracing::debug;

/// Code standing in for the annotator at `index` (0-based) of the list.
pub fn anonymize(index: usize) -> String {
    format!("c{}", index + 1)
}

/// Codes paired with annotator names, in list order.
pub fn coder_entries(annotators: &[String]) -> Vec<CoderEntry> {
    annotators
        .iter()
        .enumerate()
        .map(|(ix, annotator)| CoderEntry {
            code: anonymize(ix),
            annotator: annotator.clone(),
        })
        .collect()
}

/// Build the agreement items for `text`.
///
/// Every listed annotator must have annotated `text`; the first one that
/// did not aborts the build. Items are returned in insertion order: per
/// annotator, its own edges first, then the padding for peer-only items.
pub fn build(
    corpus: &AggregatedCorpus,
    text: &str,
    annotators: &[String],
    policy: &ReconciliationPolicy,
) -> IaaResult<Vec<AgreementItem>> {
    let edge_sets = annotators
        .iter()
        .map(|annotator| {
            corpus
                .text_edges(annotator, text)
                .ok_or_else(|| IaaError::MissingAnnotation {
                    annotator: annotator.clone(),
                    text: text.to_string(),
                })
        })
        .collect::<IaaResult<Vec<&TextEdges>>>()?;

    let mut items = Vec::new();

    for (ix, own_edges) in edge_sets.iter().enumerate() {
        let code = anonymize(ix);
        let mut present: HashSet<&str> = HashSet::new();

        for (edge, labels) in own_edges.iter() {
            let labels = LabelSet::from_labels(labels.iter().cloned());
            for item in item_ids(edge, policy) {
                present.insert(item);
                items.push(AgreementItem::new(code.as_str(), item, labels.clone()));
            }
        }

        if !policy.add_missing {
            continue;
        }

        let own_count = present.len();
        for (peer_ix, peer_edges) in edge_sets.iter().enumerate() {
            if peer_ix == ix {
                continue;
            }
            for edge in peer_edges.keys() {
                for item in item_ids(edge, policy) {
                    // insert() doubles as the duplicate check across peers
                    if present.insert(item) {
                        items.push(AgreementItem::new(
                            code.as_str(),
                            item,
                            policy.dummy_label.clone(),
                        ));
                    }
                }
            }
        }

        debug!(
            "{} ({}): {} own items, {} padded",
            code,
            annotators[ix],
            own_count,
            present.len() - own_count
        );
    }

    Ok(items)
}

/// Item identities an edge contributes under the policy.
fn item_ids<'a>(edge: &'a str, policy: &ReconciliationPolicy) -> Vec<&'a str> {
    if policy.flexible && !policy.separator.is_empty() {
        edge.split(policy.separator.as_str()).collect()
    } else {
        vec![edge]
    }
}
