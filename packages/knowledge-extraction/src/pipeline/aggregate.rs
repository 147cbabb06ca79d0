//! Knowledge aggregation: turn page text into identity-scoped facts.
//!
//! The aggregator applies the relevance scorer and the category classifier
//! to every segmented line, filters contact candidates by their surrounding
//! context, and finally re-applies the relevance gate to everything it has
//! accumulated.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace};

use crate::pipeline::classify::CategoryClassifier;
use crate::pipeline::contacts::{ContactCandidate, ContactDetector, ContactSource};
use crate::pipeline::context::strip_tags;
use crate::pipeline::relevance::RelevanceScorer;
use crate::pipeline::segment::Segmenter;
use crate::text::{self, lower};
use crate::types::category::{EDUCATION, MISC};
use crate::types::{Confidence, ExtractedFact, ExtractionConfig, Identity};

/// Length of the prefix used to relocate a contact that is not found whole.
const CONTACT_PREFIX_LEN: usize = 8;

/// Builds [`ExtractedFact`]s for one identity.
#[derive(Debug, Clone, Copy)]
pub struct KnowledgeAggregator<'a> {
    config: &'a ExtractionConfig,
    scorer: RelevanceScorer<'a>,
    classifier: CategoryClassifier<'a>,
}

impl<'a> KnowledgeAggregator<'a> {
    pub fn new(identity: &'a Identity, config: &'a ExtractionConfig) -> Self {
        Self {
            config,
            scorer: RelevanceScorer::new(identity, config),
            classifier: CategoryClassifier::new(&config.categories),
        }
    }

    pub fn scorer(&self) -> &RelevanceScorer<'a> {
        &self.scorer
    }

    pub fn config(&self) -> &'a ExtractionConfig {
        self.config
    }

    fn filtering(&self) -> bool {
        !self.scorer.identity().is_empty()
    }

    fn confidence(&self, score: u32) -> Confidence {
        Confidence::from_relevance(
            score,
            self.config.high_confidence_at,
            self.config.medium_confidence_at,
        )
    }

    /// Facts from the segmented lines of `text`.
    pub fn scan_lines(&self, text: &str, source_url: &str) -> Vec<ExtractedFact> {
        let mut facts = Vec::new();

        for line in Segmenter::new(text, self.config.max_segment_chars) {
            if !self.filtering() {
                let score = self.scorer.score(line);
                let category = self.classifier.classify(line).map_or(MISC, |(c, _)| c);
                facts.push(
                    ExtractedFact::new(category, line, source_url)
                        .with_confidence(self.confidence(score))
                        .with_relevance(score),
                );
                continue;
            }

            let Some(score) = self.scorer.relevant_score(line) else {
                continue;
            };
            let confidence = self.confidence(score);
            let best = self.classifier.classify(line);

            let category = match best {
                Some((category, weight)) if weight >= self.config.min_category_score => category,
                _ if score >= self.config.strong_relevance => best.map_or(MISC, |(c, _)| c),
                _ if self.has_strong_marker(line) => EDUCATION,
                _ => {
                    trace!(line, score, "line relevant but uncategorized");
                    continue;
                }
            };

            facts.push(
                ExtractedFact::new(category, line, source_url)
                    .with_confidence(confidence)
                    .with_relevance(score),
            );

            if self.config.secondary_categories && confidence == Confidence::High {
                for (other, weight) in self.classifier.scores(line) {
                    if other != category && weight >= self.config.min_category_score {
                        facts.push(
                            ExtractedFact::new(other, line, source_url)
                                .with_confidence(confidence)
                                .with_relevance(score),
                        );
                    }
                }
            }
        }

        debug!(url = %source_url, facts = facts.len(), "scanned lines");
        facts
    }

    fn has_strong_marker(&self, line: &str) -> bool {
        let low = lower(line);
        self.config
            .strong_markers
            .iter()
            .any(|m| low.contains(m.as_str()))
    }

    /// Contact facts from raw markup (scheme links) and plain text (tokens).
    ///
    /// A contact is kept when the text around it passes the relevance gate;
    /// the window is attached to the fact as its context.
    pub fn scan_contacts(&self, markup: &str, plain: &str, source_url: &str) -> Vec<ExtractedFact> {
        let detector = ContactDetector::new(self.config.max_scan_tokens);
        let candidates = detector
            .scan_markup(markup)
            .into_iter()
            .chain(detector.scan_text(plain));

        let mut accepted = HashSet::new();
        let mut facts = Vec::new();

        for candidate in candidates {
            let key = candidate.key();
            if accepted.contains(&key) {
                continue;
            }
            let Some((window, score)) = self.contact_evidence(&candidate, markup, plain) else {
                trace!(contact = %candidate.value, "contact rejected");
                continue;
            };
            accepted.insert(key);
            facts.push(
                ExtractedFact::new(candidate.kind.category(), candidate.value, source_url)
                    .with_confidence(self.confidence(score))
                    .with_relevance(score)
                    .with_context(window),
            );
        }

        debug!(url = %source_url, contacts = facts.len(), "scanned contacts");
        facts
    }

    /// Window around a contact and its score, if the contact is relevant.
    fn contact_evidence(
        &self,
        candidate: &ContactCandidate,
        markup: &str,
        plain: &str,
    ) -> Option<(String, u32)> {
        let window = match candidate.source {
            ContactSource::Markup => {
                if !self.scorer.is_nearby(markup, candidate.offset, self.config.markup_contact_window)
                {
                    return None;
                }
                let raw = text::window(markup, candidate.offset, self.config.contact_window);
                collapse_whitespace(&strip_tags(raw))
            }
            ContactSource::Text => {
                let pos = locate_contact(plain, &candidate.value).unwrap_or(candidate.offset);
                collapse_whitespace(text::window(plain, pos, self.config.contact_window))
            }
        };

        let score = self.scorer.score(&window);
        (!self.filtering() || self.scorer.accepts(score)).then_some((window, score))
    }

    /// All facts for one page: lines first, then contacts.
    pub fn process_page(&self, markup: &str, plain: &str, source_url: &str) -> Vec<ExtractedFact> {
        let mut facts = self.scan_lines(plain, source_url);
        facts.extend(self.scan_contacts(markup, plain, source_url));
        facts
    }

    /// Drop facts whose evidence no longer passes the relevance gate.
    ///
    /// A no-op for an empty identity.
    pub fn sweep(&self, facts: Vec<ExtractedFact>) -> Vec<ExtractedFact> {
        if !self.filtering() {
            return facts;
        }
        let before = facts.len();
        let kept: Vec<_> = facts
            .into_iter()
            .filter(|f| self.scorer.is_relevant(f.evidence()))
            .collect();
        debug!(before, after = kept.len(), "relevance sweep");
        kept
    }
}

/// Byte offset of `value` in `text` (case-insensitive), falling back to
/// its first few characters.
pub fn locate_contact(text: &str, value: &str) -> Option<usize> {
    let low = lower(text);
    let needle = lower(value);
    low.find(&needle).or_else(|| {
        let prefix = text::truncate_chars(&needle, CONTACT_PREFIX_LEN);
        (!prefix.is_empty()).then(|| low.find(prefix)).flatten()
    })
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The growing fact list for one research run.
///
/// Facts are appended page by page; exact duplicates (same category, value
/// and source) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ExtractedFact>", into = "Vec<ExtractedFact>")]
pub struct KnowledgeBase {
    facts: Vec<ExtractedFact>,
    seen: HashSet<(String, String, String)>,
}

impl From<Vec<ExtractedFact>> for KnowledgeBase {
    fn from(facts: Vec<ExtractedFact>) -> Self {
        let mut kb = Self::new();
        kb.extend(facts);
        kb
    }
}

impl From<KnowledgeBase> for Vec<ExtractedFact> {
    fn from(kb: KnowledgeBase) -> Self {
        kb.facts
    }
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fact unless it is blank or an identical one is already present.
    pub fn push(&mut self, fact: ExtractedFact) -> bool {
        if fact.value.trim().is_empty() {
            trace!(category = %fact.category, source = %fact.source_url, "blank fact ignored");
            return false;
        }
        let key = (
            fact.category.clone(),
            fact.value.clone(),
            fact.source_url.clone(),
        );
        if self.seen.insert(key) {
            self.facts.push(fact);
            true
        } else {
            false
        }
    }

    /// Add facts, returning how many were new.
    pub fn extend(&mut self, facts: impl IntoIterator<Item = ExtractedFact>) -> usize {
        facts.into_iter().map(|f| self.push(f)).filter(|&added| added).count()
    }

    /// Run the aggregator over one page and keep its facts.
    pub fn ingest_page(
        &mut self,
        aggregator: &KnowledgeAggregator<'_>,
        markup: &str,
        plain: &str,
        source_url: &str,
    ) -> usize {
        self.extend(aggregator.process_page(markup, plain, source_url))
    }

    /// Apply the final relevance sweep. Returns the number of facts dropped.
    pub fn sweep(&mut self, aggregator: &KnowledgeAggregator<'_>) -> usize {
        let before = self.facts.len();
        let kept = aggregator.sweep(std::mem::take(&mut self.facts));
        self.seen = kept
            .iter()
            .map(|f| (f.category.clone(), f.value.clone(), f.source_url.clone()))
            .collect();
        self.facts = kept;
        before - self.facts.len()
    }

    pub fn facts(&self) -> &[ExtractedFact] {
        &self.facts
    }

    pub fn into_facts(self) -> Vec<ExtractedFact> {
        self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Facts ordered by relevance score, highest first (stable).
    pub fn sorted_by_relevance(&self) -> Vec<&ExtractedFact> {
        let mut sorted: Vec<_> = self.facts.iter().collect();
        sorted.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
        sorted
    }

    /// Category → distinct values, most relevant first.
    pub fn grouped(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for fact in self.sorted_by_relevance() {
            let values = grouped.entry(fact.category.clone()).or_default();
            if !values.contains(&fact.value) {
                values.push(fact.value.clone());
            }
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::category::{CONTACT_EMAIL, CONTACT_PHONE, DEPARTMENT, DESIGNATION};

    const URL: &str = "https://acme.edu/people/jdoe";

    fn jane() -> Identity {
        Identity::new("Jane Doe", "Acme University", "")
    }

    #[test]
    fn test_designation_and_department_from_one_line() {
        let id = jane();
        let config = ExtractionConfig::default();
        let agg = KnowledgeAggregator::new(&id, &config);

        let facts = agg.scan_lines(
            "Dr. Jane Doe is a Professor in the Computer Science department.",
            URL,
        );

        let categories: Vec<_> = facts.iter().map(|f| f.category.as_str()).collect();
        assert_eq!(categories, vec![DEPARTMENT, DESIGNATION]);
        assert!(facts.iter().all(|f| f.confidence == Confidence::High));
        assert!(facts.iter().all(|f| f.source_url == URL));
    }

    #[test]
    fn test_non_ascii_name_in_other_case_is_kept() {
        let id = Identity::new("José Núñez", "", "");
        let config = ExtractionConfig::default();
        let agg = KnowledgeAggregator::new(&id, &config);

        let facts = agg.scan_lines("Dr JOSÉ NÚÑEZ is a Professor in the Physics department", URL);
        assert!(facts.iter().any(|f| f.category == DESIGNATION));

        let text = "Contact JOSÉ NÚÑEZ at jnunez@acme.edu";
        let facts = agg.scan_contacts("", text, URL);
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].value, "jnunez@acme.edu");
    }

    #[test]
    fn test_secondary_categories_can_be_disabled() {
        let id = jane();
        let config = ExtractionConfig::default().with_secondary_categories(false);
        let agg = KnowledgeAggregator::new(&id, &config);

        let facts = agg.scan_lines("Jane Doe is a Professor in the Computer Science department", URL);
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].category, DEPARTMENT);
    }

    #[test]
    fn test_irrelevant_lines_are_rejected() {
        let id = jane();
        let config = ExtractionConfig::default();
        let agg = KnowledgeAggregator::new(&id, &config);

        let facts = agg.scan_lines("John Smith is a Professor of Physics.", URL);
        assert!(facts.is_empty());
    }

    #[test]
    fn test_strongly_relevant_line_without_category_is_misc() {
        let id = jane();
        let config = ExtractionConfig::default();
        let agg = KnowledgeAggregator::new(&id, &config);

        let facts = agg.scan_lines("Jane Doe likes hiking", URL);
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].category, MISC);
        assert_eq!(facts[0].relevance_score, 50);
    }

    #[test]
    fn test_strong_marker_routes_to_education() {
        let id = Identity::new("", "Acme University", "");
        let mut config = ExtractionConfig::default();
        // only the marker path can admit the line
        config.strong_relevance = 90;
        config.min_category_score = 50;
        let agg = KnowledgeAggregator::new(&id, &config);

        let facts = agg.scan_lines("Acme University PhD", URL);
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].category, EDUCATION);
        assert_eq!(facts[0].confidence, Confidence::Medium);
    }

    #[test]
    fn test_empty_identity_accepts_every_line() {
        let id = Identity::empty();
        let config = ExtractionConfig::default();
        let agg = KnowledgeAggregator::new(&id, &config);

        let facts = agg.scan_lines("Hello world.\nShe is a professor!\n  \n", URL);
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].category, MISC);
        assert_eq!(facts[1].category, DESIGNATION);
        assert!(facts.iter().all(|f| f.confidence == Confidence::Low));
        assert!(facts.iter().all(|f| f.relevance_score == 10));
    }

    #[test]
    fn test_text_contacts_need_relevant_context() {
        let id = jane();
        let config = ExtractionConfig::default();
        let agg = KnowledgeAggregator::new(&id, &config);

        let far = "z ".repeat(400);
        let text = format!(
            "Jane Doe can be reached at jane.doe@acme.edu or +1-555-123-4567. {far} Admissions: admissions@acme.edu"
        );
        let facts = agg.scan_contacts("", &text, URL);

        let values: Vec<_> = facts.iter().map(|f| (f.category.as_str(), f.value.as_str())).collect();
        assert_eq!(
            values,
            vec![(CONTACT_EMAIL, "jane.doe@acme.edu"), (CONTACT_PHONE, "+1-555-123-4567")]
        );
        assert!(facts[0].context.as_deref().unwrap().contains("Jane Doe"));
        assert!(facts[0].relevance_score >= 10);
    }

    #[test]
    fn test_markup_contacts_use_proximity_and_window() {
        let id = jane();
        let config = ExtractionConfig::default();
        let agg = KnowledgeAggregator::new(&id, &config);

        let filler = "<div>news</div>".repeat(60);
        let markup = format!(
            r#"<h1>Jane Doe</h1><a href="mailto:jdoe@acme.edu">email</a>{filler}<a href="mailto:info@acme.edu">x</a>"#
        );
        let facts = agg.scan_contacts(&markup, "", URL);

        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].value, "jdoe@acme.edu");
        let context = facts[0].context.as_deref().unwrap();
        assert!(!context.contains('<'));
    }

    #[test]
    fn test_sweep_uses_contact_context() {
        let id = jane();
        let config = ExtractionConfig::default();
        let agg = KnowledgeAggregator::new(&id, &config);

        let kept = ExtractedFact::new(CONTACT_EMAIL, "j@acme.edu", URL).with_context("Jane Doe j@acme.edu");
        let dropped = ExtractedFact::new(MISC, "Parking information", URL);

        let facts = agg.sweep(vec![kept.clone(), dropped]);
        assert_eq!(facts, vec![kept]);
    }

    #[test]
    fn test_locate_contact() {
        assert_eq!(locate_contact("Mail: JANE@acme.edu", "jane@acme.edu"), Some(6));
        assert_eq!(locate_contact("Mail: jane.doe@ac me.edu", "jane.doe@acme.edu"), Some(6));
        assert_eq!(locate_contact("nothing", "jane@acme.edu"), None);
    }

    #[test]
    fn test_knowledge_base_dedupes_and_groups() {
        let mut kb = KnowledgeBase::new();
        let a = ExtractedFact::new(DESIGNATION, "Professor", URL).with_relevance(40);
        let b = ExtractedFact::new(DESIGNATION, "Dean", "https://other").with_relevance(60);

        assert!(kb.push(a.clone()));
        assert!(!kb.push(a));
        assert_eq!(kb.extend(vec![b]), 1);
        assert_eq!(kb.len(), 2);

        assert!(!kb.push(ExtractedFact::new(MISC, "  \n\t", URL)));
        assert!(!kb.push(ExtractedFact::new(MISC, "", URL)));
        assert_eq!(kb.len(), 2);
        assert_eq!(KnowledgeBase::from(vec![ExtractedFact::new(MISC, " ", URL)]).len(), 0);

        let grouped = kb.grouped();
        assert_eq!(grouped[DESIGNATION], vec!["Dean", "Professor"]);
        assert_eq!(kb.sorted_by_relevance()[0].value, "Dean");
    }

    #[test]
    fn test_knowledge_base_sweep() {
        let id = jane();
        let config = ExtractionConfig::default();
        let agg = KnowledgeAggregator::new(&id, &config);

        let mut kb = KnowledgeBase::from(vec![
            ExtractedFact::new(MISC, "Jane Doe likes hiking", URL),
            ExtractedFact::new(MISC, "Unrelated", URL),
        ]);
        assert_eq!(kb.sweep(&agg), 1);
        assert_eq!(kb.len(), 1);

        let json = serde_json::to_value(&kb).unwrap();
        assert!(json.is_array());
    }
}
