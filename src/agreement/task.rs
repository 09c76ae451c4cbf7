//! Agreement coefficients over a set of (coder, item, labels) triples.
//!
//! Follows the usual multi-coder definitions:
//!
//! - average observed agreement over all coder pairs
//! - multi-kappa (Davies and Fleiss 1982): pairwise-averaged observed and
//!   expected agreement
//! - Krippendorff's alpha (1980) with pairable values only, so items a
//!   single coder labeled do not count

use super::distance::Distance;
use crate::models::{AgreementItem, Coefficients, LabelSet};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::debug;

/// Degenerate inputs for which a coefficient is undefined.
#[derive(Debug, Error, PartialEq)]
pub enum AgreementError {
    #[error("no annotation data")]
    NoData,

    #[error("agreement needs at least two coders, found {0}")]
    TooFewCoders(usize),

    #[error("no item was labeled by more than one coder")]
    NoPairableItems,

    #[error("{0} is undefined: expected disagreement is zero")]
    ZeroExpectedDisagreement(&'static str),
}

/// Labels of every coder on every item, ready for coefficient computation.
#[derive(Debug, Clone)]
pub struct AnnotationTask {
    distance: Distance,
    coders: Vec<String>,
    /// item -> coder -> labels; the first triple for a (coder, item) pair wins
    labels: BTreeMap<String, BTreeMap<String, LabelSet>>,
}

impl AnnotationTask {
    /// Create a task from agreement triples.
    pub fn new(data: &[AgreementItem], distance: Distance) -> Self {
        let mut coders = BTreeSet::new();
        let mut labels: BTreeMap<String, BTreeMap<String, LabelSet>> = BTreeMap::new();

        for triple in data {
            coders.insert(triple.coder.clone());
            labels
                .entry(triple.item.clone())
                .or_default()
                .entry(triple.coder.clone())
                .or_insert_with(|| triple.labels.clone());
        }

        Self {
            distance,
            coders: coders.into_iter().collect(),
            labels,
        }
    }

    pub fn coder_count(&self) -> usize {
        self.coders.len()
    }

    pub fn item_count(&self) -> usize {
        self.labels.len()
    }

    /// Distinct label values used by any coder.
    fn values(&self) -> BTreeSet<&LabelSet> {
        self.labels
            .values()
            .flat_map(|by_coder| by_coder.values())
            .collect()
    }

    fn check_pairs(&self) -> Result<(), AgreementError> {
        if self.labels.is_empty() {
            return Err(AgreementError::NoData);
        }
        if self.coders.len() < 2 {
            return Err(AgreementError::TooFewCoders(self.coders.len()));
        }
        Ok(())
    }

    /// Average `f` over all unordered coder pairs.
    fn pairwise_average<F>(&self, f: F) -> f64
    where
        F: Fn(&str, &str) -> f64,
    {
        let mut total = 0.0;
        let mut pairs = 0usize;

        for (ix, a) in self.coders.iter().enumerate() {
            for b in &self.coders[ix + 1..] {
                total += f(a.as_str(), b.as_str());
                pairs += 1;
            }
        }

        total / pairs as f64
    }

    /// Observed agreement between two coders.
    ///
    /// Divided by the total number of items; an item only one of the two
    /// labeled contributes nothing.
    fn observed(&self, a: &str, b: &str) -> f64 {
        let total: f64 = self
            .labels
            .values()
            .filter_map(|by_coder| Some((by_coder.get(a)?, by_coder.get(b)?)))
            .map(|(la, lb)| 1.0 - self.distance.between(la, lb))
            .sum();

        total / self.item_count() as f64
    }

    /// Chance agreement between two coders from their own label distributions.
    fn expected_kappa(&self, a: &str, b: &str) -> f64 {
        let n = self.item_count() as f64;
        let mut counts: BTreeMap<&LabelSet, (usize, usize)> = BTreeMap::new();

        for by_coder in self.labels.values() {
            if let Some(la) = by_coder.get(a) {
                counts.entry(la).or_default().0 += 1;
            }
            if let Some(lb) = by_coder.get(b) {
                counts.entry(lb).or_default().1 += 1;
            }
        }

        counts
            .values()
            .map(|&(na, nb)| (na as f64 / n) * (nb as f64 / n))
            .sum()
    }

    /// Average observed agreement across all coders and items.
    pub fn avg_ao(&self) -> Result<f64, AgreementError> {
        self.check_pairs()?;
        Ok(self.pairwise_average(|a, b| self.observed(a, b)))
    }

    /// Davies and Fleiss multi-kappa.
    pub fn multi_kappa(&self) -> Result<f64, AgreementError> {
        let ao = self.avg_ao()?;
        let ae = self.pairwise_average(|a, b| self.expected_kappa(a, b));
        debug!("multi-kappa: Ao = {:.6}, Ae = {:.6}", ao, ae);

        if (1.0 - ae).abs() < 1e-12 {
            return Err(AgreementError::ZeroExpectedDisagreement("multi-kappa"));
        }
        Ok((ao - ae) / (1.0 - ae))
    }

    /// Krippendorff's alpha.
    pub fn alpha(&self) -> Result<f64, AgreementError> {
        let values = self.values();
        if values.is_empty() {
            return Err(AgreementError::NoData);
        }
        if values.len() == 1 {
            debug!("Only one label value, alpha is 1");
            return Ok(1.0);
        }
        if self.coders.len() < 2 {
            return Err(AgreementError::TooFewCoders(self.coders.len()));
        }

        let mut pairable: BTreeMap<&LabelSet, usize> = BTreeMap::new();
        let mut total_do = 0.0;

        for by_coder in self.labels.values() {
            if by_coder.len() < 2 {
                continue;
            }
            let mut freqs: BTreeMap<&LabelSet, usize> = BTreeMap::new();
            for labels in by_coder.values() {
                *freqs.entry(labels).or_default() += 1;
                *pairable.entry(labels).or_default() += 1;
            }
            total_do += self.disagreement(&freqs) * by_coder.len() as f64;
        }

        let pairable_count: usize = pairable.values().sum();
        if pairable_count == 0 {
            return Err(AgreementError::NoPairableItems);
        }

        let d_o = total_do / pairable_count as f64;
        let d_e = self.disagreement(&pairable);
        debug!("alpha: Do = {:.6}, De = {:.6}", d_o, d_e);

        if d_e == 0.0 {
            return Err(AgreementError::ZeroExpectedDisagreement("alpha"));
        }
        Ok(1.0 - d_o / d_e)
    }

    /// Mean pairwise distance between the values in `freqs`.
    fn disagreement(&self, freqs: &BTreeMap<&LabelSet, usize>) -> f64 {
        let total: usize = freqs.values().sum();
        if total < 2 {
            return 0.0;
        }

        let mut pairs = 0.0;
        for (j, nj) in freqs {
            for (l, nl) in freqs {
                pairs += (*nj * *nl) as f64 * self.distance.between(l, j);
            }
        }

        pairs / (total * (total - 1)) as f64
    }

    /// All three coefficients at once.
    pub fn coefficients(&self) -> Result<Coefficients, AgreementError> {
        Ok(Coefficients {
            avg_agreement: self.avg_ao()?,
            multi_kappa: self.multi_kappa()?,
            alpha: self.alpha()?,
        })
    }
}
