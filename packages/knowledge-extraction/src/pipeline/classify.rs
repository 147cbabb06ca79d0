//! Weighted keyword classification of lines into categories.

use crate::text::lower;
use crate::types::CategoryTable;

/// Weight of a keyword hit: longer keywords are more specific.
pub fn keyword_weight(keyword: &str) -> u32 {
    (keyword.len() / 4) as u32 + 1
}

/// Assigns categories using a [`CategoryTable`].
#[derive(Debug, Clone, Copy)]
pub struct CategoryClassifier<'a> {
    table: &'a CategoryTable,
}

impl<'a> CategoryClassifier<'a> {
    pub fn new(table: &'a CategoryTable) -> Self {
        Self { table }
    }

    /// Weighted score of every category for `line`, in table order.
    pub fn scores(&self, line: &str) -> Vec<(&'a str, u32)> {
        let low = lower(line);
        self.table
            .rules()
            .iter()
            .map(|rule| {
                let score = rule
                    .keywords
                    .iter()
                    .filter(|k| low.contains(k.as_str()))
                    .map(|k| keyword_weight(k))
                    .sum();
                (rule.name.as_str(), score)
            })
            .collect()
    }

    /// Best category for `line` and its score.
    ///
    /// Returns `None` when no keyword matches. Ties go to the earlier table
    /// entry.
    pub fn classify(&self, line: &str) -> Option<(&'a str, u32)> {
        let mut best: Option<(&'a str, u32)> = None;
        for (name, score) in self.scores(line) {
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((name, score));
            }
        }
        best
    }
}
