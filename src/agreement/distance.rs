//! Distances between label sets.

use crate::models::LabelSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance function used to compare two coders' labels on an item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    /// `1 - |A ∩ B| / |A ∪ B|`
    #[default]
    Jaccard,
    /// Passonneau's MASI: Jaccard weighted by a monotonicity factor
    Masi,
}

impl Distance {
    /// Distance between `a` and `b`, in `[0, 1]`.
    pub fn between(self, a: &LabelSet, b: &LabelSet) -> f64 {
        match self {
            Distance::Jaccard => jaccard_distance(a, b),
            Distance::Masi => masi_distance(a, b),
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Jaccard => write!(f, "jaccard"),
            Distance::Masi => write!(f, "masi"),
        }
    }
}

/// Jaccard distance. Two empty sets are identical.
pub fn jaccard_distance(a: &LabelSet, b: &LabelSet) -> f64 {
    let union = a.union_len(b);
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection_len(b);
    (union - intersection) as f64 / union as f64
}

/// MASI distance (Passonneau 2006).
pub fn masi_distance(a: &LabelSet, b: &LabelSet) -> f64 {
    let union = a.union_len(b);
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection_len(b);

    let monotonicity = if a.len() == b.len() && a.len() == intersection {
        1.0
    } else if intersection == a.len().min(b.len()) {
        0.67
    } else if intersection > 0 {
        0.33
    } else {
        0.0
    };

    1.0 - (intersection as f64 / union as f64) * monotonicity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(labels: &[&str]) -> LabelSet {
        LabelSet::from_labels(labels.iter().copied())
    }

    #[test]
    fn test_jaccard_identical_and_disjoint() {
        assert_eq!(jaccard_distance(&set(&["OM"]), &set(&["OM"])), 0.0);
        assert_eq!(jaccard_distance(&set(&["OM"]), &set(&["CORR"])), 1.0);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        let d = jaccard_distance(&set(&["A", "B"]), &set(&["B", "C"]));
        assert!((d - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_masi_subset_and_overlap() {
        // subset: intersection 1, union 2, m = 0.67
        let d = masi_distance(&set(&["A"]), &set(&["A", "B"]));
        assert!((d - (1.0 - 0.5 * 0.67)).abs() < 1e-12);

        // overlap without subset: intersection 1, union 3, m = 0.33
        let d = masi_distance(&set(&["A", "B"]), &set(&["B", "C"]));
        assert!((d - (1.0 - (1.0 / 3.0) * 0.33)).abs() < 1e-12);

        assert_eq!(masi_distance(&set(&["A"]), &set(&["A"])), 0.0);
        assert_eq!(masi_distance(&set(&["A"]), &set(&["B"])), 1.0);
    }

    #[test]
    fn test_distance_dispatch() {
        let a = set(&["A"]);
        let b = set(&["A", "B"]);
        assert_eq!(Distance::Jaccard.between(&a, &b), 0.5);
        assert!(Distance::Masi.between(&a, &b) > 0.5);
        assert_eq!(Distance::Masi.to_string(), "masi");
    }
}
