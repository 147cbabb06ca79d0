//! Configuration types for the extraction engine and the research pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::category::CategoryTable;
use crate::text::lower;

/// Weights for the relevance scorer.
///
/// The defaults are an empirical policy; every value is tunable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceWeights {
    /// Full name appears verbatim (case-insensitive).
    pub exact_name: u32,
    /// Two or more name parts appear individually.
    pub name_parts: u32,
    /// Per title word, when the exact name is also present.
    pub title: u32,
    pub organization_exact: u32,
    pub organization_partial: u32,
    /// Added when the exact organization co-occurs with the exact name.
    pub organization_with_name: u32,
    pub sub_unit_exact: u32,
    pub sub_unit_partial: u32,
    /// Added when the exact sub-unit co-occurs with the exact name.
    pub sub_unit_with_name: u32,
    /// Per generic academic context word.
    pub context_word: u32,
    pub cap: u32,
    /// Fixed score given to every fragment when the identity is empty.
    pub empty_identity: u32,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            exact_name: 30,
            name_parts: 20,
            title: 10,
            organization_exact: 15,
            organization_partial: 10,
            organization_with_name: 5,
            sub_unit_exact: 15,
            sub_unit_partial: 10,
            sub_unit_with_name: 5,
            context_word: 2,
            cap: 100,
            empty_identity: 10,
        }
    }
}

/// Configuration for the extraction engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub weights: RelevanceWeights,

    /// Role words that earn the title bonus (lowercase).
    pub title_words: Vec<String>,

    /// Generic academic/professional words (lowercase).
    pub context_words: Vec<String>,

    /// A fragment is relevant at or above this score.
    ///
    /// Default: 10.
    pub relevance_threshold: u32,

    /// Score at which the identity is clearly present: lines with no
    /// category are kept as `Misc`, paragraphs survive context focusing.
    ///
    /// Default: 15.
    pub strong_relevance: u32,

    /// Minimum weighted keyword score for a category to count.
    ///
    /// Default: 2.
    pub min_category_score: u32,

    pub high_confidence_at: u32,
    pub medium_confidence_at: u32,

    /// Running fragments longer than this are flushed as a segment.
    pub max_segment_chars: usize,

    /// Character budget applied to page text before extraction.
    pub max_content_chars: usize,

    /// Maximum whitespace tokens inspected by the contact token scan.
    pub max_scan_tokens: usize,

    /// Radius of the relevance window around a token-scanned contact.
    pub contact_window: usize,

    /// Proximity radius for contacts found in raw markup.
    pub markup_contact_window: usize,

    /// Unambiguous education markers (lowercase) that admit a line on
    /// the relevance gate alone.
    pub strong_markers: Vec<String>,

    /// Record extra facts for other qualifying categories of
    /// high-confidence lines.
    ///
    /// Default: true.
    pub secondary_categories: bool,

    pub categories: CategoryTable,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            weights: RelevanceWeights::default(),
            title_words: vec!["professor".into(), "dr.".into()],
            context_words: vec![
                "faculty".into(),
                "research".into(),
                "publication".into(),
                "conference".into(),
                "journal".into(),
            ],
            relevance_threshold: 10,
            strong_relevance: 15,
            min_category_score: 2,
            high_confidence_at: 30,
            medium_confidence_at: 20,
            max_segment_chars: 1000,
            max_content_chars: 20_000,
            max_scan_tokens: 2_000,
            contact_window: 200,
            markup_contact_window: 300,
            strong_markers: vec!["phd".into(), "ph.d".into(), "cv".into()],
            secondary_categories: true,
            categories: CategoryTable::default(),
        }
    }
}

impl ExtractionConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(mut self, weights: RelevanceWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_relevance_threshold(mut self, threshold: u32) -> Self {
        self.relevance_threshold = threshold;
        self
    }

    pub fn with_strong_relevance(mut self, score: u32) -> Self {
        self.strong_relevance = score;
        self
    }

    pub fn with_min_category_score(mut self, score: u32) -> Self {
        self.min_category_score = score;
        self
    }

    pub fn with_title_words(mut self, words: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.title_words = lowercase_all(words);
        self
    }

    pub fn with_context_words(mut self, words: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.context_words = lowercase_all(words);
        self
    }

    pub fn with_strong_markers(mut self, markers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.strong_markers = lowercase_all(markers);
        self
    }

    pub fn with_max_segment_chars(mut self, max: usize) -> Self {
        self.max_segment_chars = max;
        self
    }

    pub fn with_max_content_chars(mut self, max: usize) -> Self {
        self.max_content_chars = max;
        self
    }

    pub fn with_max_scan_tokens(mut self, max: usize) -> Self {
        self.max_scan_tokens = max;
        self
    }

    pub fn with_contact_window(mut self, radius: usize) -> Self {
        self.contact_window = radius;
        self
    }

    pub fn with_markup_contact_window(mut self, radius: usize) -> Self {
        self.markup_contact_window = radius;
        self
    }

    pub fn with_secondary_categories(mut self, enabled: bool) -> Self {
        self.secondary_categories = enabled;
        self
    }

    /// Replace the category keyword table.
    pub fn with_categories(mut self, categories: CategoryTable) -> Self {
        self.categories = categories;
        self
    }
}

fn lowercase_all(words: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    words
        .into_iter()
        .map(|w| lower(&w.into()))
        .collect()
}

/// Configuration for the research pipeline around the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Search results to process.
    ///
    /// Default: 3.
    pub max_results: usize,

    pub fetch_timeout: Duration,
    pub connect_timeout: Duration,

    /// Downloads past this size are aborted.
    ///
    /// Default: 8 MiB.
    pub max_download_bytes: usize,

    /// Wall-clock budget for markup-to-text conversion.
    pub parse_timeout: Duration,

    /// Pages whose markup contains none of these skip text conversion
    /// (only their scheme-link contacts are considered).
    pub contact_keywords: Vec<String>,

    /// Keep only paragraphs that clearly mention the identity.
    pub focus_context: bool,

    pub user_agent: String,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_results: 3,
            fetch_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_download_bytes: 8 * 1024 * 1024,
            parse_timeout: Duration::from_secs(20),
            contact_keywords: vec!["email".into(), "contact".into(), "phone".into(), "@".into()],
            focus_context: true,
            user_agent: "Mozilla/5.0 (compatible; KnowledgeExtractor/0.1)".into(),
        }
    }
}

impl ResearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_max_download_bytes(mut self, max: usize) -> Self {
        self.max_download_bytes = max;
        self
    }

    pub fn with_parse_timeout(mut self, timeout: Duration) -> Self {
        self.parse_timeout = timeout;
        self
    }

    pub fn with_contact_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.contact_keywords = lowercase_all(keywords);
        self
    }

    pub fn with_focus_context(mut self, enabled: bool) -> Self {
        self.focus_context = enabled;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}
