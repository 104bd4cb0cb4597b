//! Document frequency over reference groups.
//!
//! A group is every reference caption of one image. An n-gram counts once
//! per group it appears in, however often it repeats inside the group.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use log::debug;
use rayon::prelude::*;

use crate::ngrams::{Ngram, NgramCounts};

/// Document frequencies plus the number of groups they were counted over.
///
/// Every stored count lies in `1.0..=ref_len as f64`; unseen n-grams are
/// absent rather than zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusStats<T: Eq + Hash> {
    pub document_frequency: HashMap<Ngram<T>, f64>,
    pub ref_len: usize,
}

impl<T: Eq + Hash> Default for CorpusStats<T> {
    fn default() -> Self {
        Self {
            document_frequency: HashMap::new(),
            ref_len: 0,
        }
    }
}

impl<T> CorpusStats<T>
where
    T: Clone + Eq + Hash,
{
    /// Fold one group's cooked references in.
    ///
    /// Empty groups still count toward `ref_len`.
    pub fn add_group(
        &mut self,
        refs: &[NgramCounts<T>],
    ) {
        let present: HashSet<&Ngram<T>> = refs.iter().flat_map(|r| r.keys()).collect();
        for ngram in present {
            match self.document_frequency.get_mut(ngram) {
                Some(df) => *df += 1.0,
                None => {
                    self.document_frequency.insert(ngram.clone(), 1.0);
                }
            }
        }
        self.ref_len += 1;
    }

    /// Combine statistics built over disjoint sets of groups.
    pub fn merge(
        mut self,
        other: Self,
    ) -> Self {
        if self.document_frequency.len() < other.document_frequency.len() {
            return other.merge(self);
        }
        for (ngram, df) in other.document_frequency {
            *self.document_frequency.entry(ngram).or_default() += df;
        }
        self.ref_len += other.ref_len;
        self
    }
}

impl<T: Eq + Hash> CorpusStats<T> {
    /// Number of groups containing `ngram`, `0.0` if it never appeared.
    pub fn doc_freq(
        &self,
        ngram: &[T],
    ) -> f64 {
        self.document_frequency.get(ngram).copied().unwrap_or(0.0)
    }

    /// Number of distinct n-grams seen.
    pub fn len(&self) -> usize {
        self.document_frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document_frequency.is_empty()
    }
}

/// Build document frequencies serially, one group at a time.
pub fn compute_doc_freq<T>(crefs: &[Vec<NgramCounts<T>>]) -> CorpusStats<T>
where
    T: Clone + Eq + Hash,
{
    let mut stats = CorpusStats::default();
    for refs in crefs {
        stats.add_group(refs);
    }
    debug!(
        "document frequency: {} n-grams over {} groups",
        stats.len(),
        stats.ref_len
    );
    stats
}

/// Same result as [`compute_doc_freq`], with groups spread over the rayon pool.
///
/// Each worker folds a partial table over its own groups; the partials are
/// then merged.
pub fn compute_doc_freq_par<T>(crefs: &[Vec<NgramCounts<T>>]) -> CorpusStats<T>
where
    T: Clone + Eq + Hash + Send + Sync,
{
    let stats = crefs
        .par_iter()
        .fold(CorpusStats::default, |mut acc, refs| {
            acc.add_group(refs);
            acc
        })
        .reduce(CorpusStats::default, CorpusStats::merge);
    debug!(
        "document frequency (parallel): {} n-grams over {} groups",
        stats.len(),
        stats.ref_len
    );
    stats
}
