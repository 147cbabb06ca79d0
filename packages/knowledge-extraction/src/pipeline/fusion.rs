//! Fact fusion: merge near-duplicate facts gathered from several pages.
//!
//! Clustering is first-fit and incremental: each fact joins the first
//! existing cluster of the same category whose representative value is
//! roughly the same, otherwise it starts a new cluster. A cluster keeps the
//! value it was created with, so fusing an already fused list is a no-op.

use std::collections::HashSet;
use tracing::debug;

use crate::text::{lower, trim_punct_edges};
use crate::types::{ExtractedFact, UnifiedFact};

/// Default word-overlap ratio above which two values are merged.
pub const DEFAULT_OVERLAP_THRESHOLD: f32 = 0.6;

/// Lowercase with all whitespace removed.
fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn word_set(s: &str) -> HashSet<String> {
    s.split_whitespace()
        .map(|w| trim_punct_edges(w).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Fraction of shared words, relative to the larger word set.
pub fn word_overlap(a: &str, b: &str) -> f32 {
    let (wa, wb) = (word_set(a), word_set(b));
    if wa.is_empty() || wb.is_empty() {
        return 0.0;
    }
    let shared = wa.intersection(&wb).count();
    shared as f32 / wa.len().max(wb.len()) as f32
}

/// Whether two values describe the same thing.
///
/// Equal, or one contained in the other ignoring case and whitespace, or a
/// word overlap strictly above `threshold`.
pub fn roughly_same(a: &str, b: &str, threshold: f32) -> bool {
    if a == b {
        return true;
    }
    let (sa, sb) = (squash(a), squash(b));
    if !sa.is_empty() && !sb.is_empty() && (sa.contains(&sb) || sb.contains(&sa)) {
        return true;
    }
    word_overlap(a, b) > threshold
}

/// First-fit fact clustering.
#[derive(Debug, Clone, Copy)]
pub struct FactFusion {
    overlap_threshold: f32,
}

impl Default for FactFusion {
    fn default() -> Self {
        Self {
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
        }
    }
}

impl FactFusion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overlap_threshold(mut self, threshold: f32) -> Self {
        self.overlap_threshold = threshold;
        self
    }

    fn find_cluster<'c>(
        &self,
        clusters: &'c mut [UnifiedFact],
        category: &str,
        value: &str,
    ) -> Option<&'c mut UnifiedFact> {
        clusters
            .iter_mut()
            .find(|u| u.category == category && roughly_same(&u.value, value, self.overlap_threshold))
    }

    /// Fuse extracted facts into unified facts, in input order.
    pub fn fuse(&self, facts: &[ExtractedFact]) -> Vec<UnifiedFact> {
        let mut clusters: Vec<UnifiedFact> = Vec::new();
        for fact in facts {
            match self.find_cluster(&mut clusters, &fact.category, &fact.value) {
                Some(cluster) => cluster.absorb(fact),
                None => clusters.push(UnifiedFact::from_fact(fact)),
            }
        }
        debug!(facts = facts.len(), unified = clusters.len(), "fused facts");
        clusters
    }

    /// Re-fuse unified facts, keeping every source of merged clusters.
    pub fn fuse_unified(&self, unified: Vec<UnifiedFact>) -> Vec<UnifiedFact> {
        let mut clusters: Vec<UnifiedFact> = Vec::new();
        for fact in unified {
            match self.find_cluster(&mut clusters, &fact.category, &fact.value) {
                Some(cluster) => cluster.absorb_unified(fact),
                None => clusters.push(fact),
            }
        }
        clusters
    }
}

/// Fuse with the default overlap threshold.
pub fn fuse_facts(facts: &[ExtractedFact]) -> Vec<UnifiedFact> {
    FactFusion::default().fuse(facts)
}

/// Unified facts ordered by relevance score, highest first (stable).
pub fn sort_by_relevance(unified: &mut [UnifiedFact]) {
    unified.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
}
