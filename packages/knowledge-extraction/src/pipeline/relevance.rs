//! Relevance scoring: does a text fragment concern the target identity?
//!
//! The score is a sum of independent substring signals, so adding text to a
//! fragment can only add signals. Scores are capped at
//! [`RelevanceWeights::cap`](crate::types::RelevanceWeights).

use crate::text::lower;
use crate::types::{ExtractionConfig, Identity};

/// Scores fragments against one identity under one configuration.
#[derive(Debug, Clone, Copy)]
pub struct RelevanceScorer<'a> {
    identity: &'a Identity,
    config: &'a ExtractionConfig,
}

impl<'a> RelevanceScorer<'a> {
    pub fn new(identity: &'a Identity, config: &'a ExtractionConfig) -> Self {
        Self { identity, config }
    }

    pub fn identity(&self) -> &'a Identity {
        self.identity
    }

    /// Heuristic relevance of `text` to the identity.
    ///
    /// An empty identity scores every fragment at the fixed
    /// `empty_identity` weight.
    pub fn score(&self, text: &str) -> u32 {
        let w = &self.config.weights;
        if self.identity.is_empty() {
            return w.empty_identity;
        }

        let low = lower(text);
        let has = |term: &str| !term.is_empty() && low.contains(&lower(term));

        let mut score = 0;
        let exact_name = has(self.identity.name());

        if exact_name {
            score += w.exact_name;
            let titles = self
                .config
                .title_words
                .iter()
                .filter(|t| low.contains(t.as_str()))
                .count() as u32;
            score += titles * w.title;
        }
        if contains_multiple_parts(&low, self.identity.name_parts()) {
            score += w.name_parts;
        }

        let exact_org = has(self.identity.organization());
        if exact_org {
            score += w.organization_exact;
            if exact_name {
                score += w.organization_with_name;
            }
        }
        if contains_multiple_parts(&low, self.identity.organization_parts()) {
            score += w.organization_partial;
        }

        let exact_sub_unit = has(self.identity.sub_unit());
        if exact_sub_unit {
            score += w.sub_unit_exact;
            if exact_name {
                score += w.sub_unit_with_name;
            }
        }
        if contains_multiple_parts(&low, self.identity.sub_unit_parts()) {
            score += w.sub_unit_partial;
        }

        let context_hits = self
            .config
            .context_words
            .iter()
            .filter(|t| low.contains(t.as_str()))
            .count() as u32;
        score += context_hits * w.context_word;

        score.min(w.cap)
    }

    /// True when `score` clears the acceptance threshold.
    pub fn accepts(&self, score: u32) -> bool {
        score >= self.config.relevance_threshold
    }

    /// Score `text` and return the score only if it is relevant.
    pub fn relevant_score(&self, text: &str) -> Option<u32> {
        let score = self.score(text);
        self.accepts(score).then_some(score)
    }

    pub fn is_relevant(&self, text: &str) -> bool {
        self.relevant_score(text).is_some()
    }

    /// Proximity check for a bare position.
    ///
    /// True when any identity term, or any of its parts, occurs within
    /// `window` bytes of `pos` in `haystack`. Always true for an empty
    /// identity.
    pub fn is_nearby(&self, haystack: &str, pos: usize, window: usize) -> bool {
        if self.identity.is_empty() {
            return true;
        }
        if haystack.is_empty() {
            return false;
        }

        let low = lower(haystack);
        let lo = pos.saturating_sub(window);
        let hi = pos.saturating_add(window).min(low.len() - 1);

        self.identity.terms().any(|(term, parts)| {
            std::iter::once(lower(term))
                .chain(parts.iter().cloned())
                .any(|needle| occurs_between(&low, &needle, lo, hi))
        })
    }
}

/// At least two parts present; with exactly two parts both are required.
fn contains_multiple_parts(low: &str, parts: &[String]) -> bool {
    if parts.len() < 2 {
        return false;
    }
    let matches = parts.iter().filter(|p| low.contains(p.as_str())).count();
    if parts.len() == 2 {
        matches == 2
    } else {
        matches >= 2
    }
}

/// Any occurrence of `needle` starting within `lo..=hi`.
fn occurs_between(haystack: &str, needle: &str, lo: usize, hi: usize) -> bool {
    !needle.is_empty()
        && haystack
            .match_indices(needle)
            .map(|(at, _)| at)
            .take_while(|&at| at <= hi)
            .any(|at| at >= lo)
}
