//! Research pipeline: search, fetch, extract, fuse.
//!
//! ```text
//! Identity → WebSearcher → PageFetcher ─┬─ scheme scan (raw markup)
//!                                       └─ convert → focus → denoise → truncate
//!                                              ↓
//!                                       KnowledgeAggregator → KnowledgeBase
//!                                              ↓
//!                                     sweep → fusion → narrative
//! ```
//!
//! Pages are processed one at a time. A page that cannot be fetched is
//! logged and skipped; only a failed search aborts the run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::converters::{convert_with_timeout, HtmlTextConverter, TextConverter};
use crate::error::Result;
use crate::fetchers::fetch_with_deadline;
use crate::pipeline::aggregate::{KnowledgeAggregator, KnowledgeBase};
use crate::pipeline::context::{
    contains_any_keyword, focus_target_context, remove_noise_phrases, truncate_chars,
};
use crate::pipeline::fusion::{sort_by_relevance, FactFusion};
use crate::pipeline::narrative::generate_narrative;
use crate::pipeline::refine::RefinedProfile;
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::traits::refiner::Refiner;
use crate::traits::searcher::WebSearcher;
use crate::types::{ExtractedFact, ExtractionConfig, Identity, ResearchConfig, UnifiedFact};

/// Everything one research run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    pub identity: Identity,

    /// Query sent to the searcher
    pub query: String,

    /// Knowledge base after the final sweep
    pub facts: Vec<ExtractedFact>,

    /// Fused facts, most relevant first
    pub unified: Vec<UnifiedFact>,

    pub narrative: String,

    pub pages_processed: usize,
    pub pages_failed: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refined: Option<RefinedProfile>,

    /// Refiner reply that could not be parsed, kept for inspection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_refinement: Option<String>,
}

impl ResearchReport {
    fn empty(identity: &Identity) -> Self {
        Self {
            identity: identity.clone(),
            query: identity.search_query(),
            facts: Vec::new(),
            unified: Vec::new(),
            narrative: String::new(),
            pages_processed: 0,
            pages_failed: 0,
            refined: None,
            raw_refinement: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// The knowledge base as a report view (category → values).
    pub fn grouped(&self) -> std::collections::BTreeMap<String, Vec<String>> {
        KnowledgeBase::from(self.facts.clone()).grouped()
    }

    /// Run the refiner over the facts and attach its profile.
    ///
    /// A refiner failure is logged and leaves the report unrefined; an
    /// unparsable reply is kept in `raw_refinement`. Returns whether a
    /// profile was attached.
    pub async fn refine_with<R: Refiner + ?Sized>(&mut self, refiner: &R) -> bool {
        if self.facts.is_empty() {
            debug!("nothing to refine");
            return false;
        }
        match refiner.refine(&self.identity, &self.facts).await {
            Ok(profile) => {
                info!(name = %profile.name, "knowledge base refined");
                self.refined = Some(profile);
                self.raw_refinement = None;
                true
            }
            Err(e) => {
                warn!(error = %e, "refinement failed, keeping unrefined facts");
                self.raw_refinement = e.raw_reply().map(str::to_string);
                false
            }
        }
    }
}

/// Drives a [`WebSearcher`] and a [`PageFetcher`] through the engine.
///
/// # Example
///
/// ```rust,ignore
/// use knowledge_extraction::fetchers::HttpFetcher;
/// use knowledge_extraction::pipeline::Researcher;
/// use knowledge_extraction::searchers::GoogleSearcher;
///
/// let researcher = Researcher::new(GoogleSearcher::new(creds), HttpFetcher::new(&config)?)
///     .with_research_config(config);
/// let report = researcher.run(&Identity::new("Jane Doe", "Acme University", "")).await?;
/// println!("{}", report.narrative);
/// ```
pub struct Researcher<S, F> {
    searcher: S,
    fetcher: F,
    extraction: ExtractionConfig,
    research: ResearchConfig,
    converter: Arc<dyn TextConverter>,
}

impl<S: WebSearcher, F: PageFetcher> Researcher<S, F> {
    pub fn new(searcher: S, fetcher: F) -> Self {
        Self {
            searcher,
            fetcher,
            extraction: ExtractionConfig::default(),
            research: ResearchConfig::default(),
            converter: Arc::new(HtmlTextConverter::new()),
        }
    }

    pub fn with_extraction_config(mut self, config: ExtractionConfig) -> Self {
        self.extraction = config;
        self
    }

    pub fn with_research_config(mut self, config: ResearchConfig) -> Self {
        self.research = config;
        self
    }

    pub fn with_converter(mut self, converter: Arc<dyn TextConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn extraction_config(&self) -> &ExtractionConfig {
        &self.extraction
    }

    pub fn research_config(&self) -> &ResearchConfig {
        &self.research
    }

    /// Research one identity end to end.
    ///
    /// An empty identity yields an empty report without searching.
    pub async fn run(&self, identity: &Identity) -> Result<ResearchReport> {
        let mut report = ResearchReport::empty(identity);
        if identity.is_empty() {
            warn!("empty identity, nothing to research");
            return Ok(report);
        }

        info!(query = %report.query, max_results = self.research.max_results, "searching");
        let results = self
            .searcher
            .search(&report.query, self.research.max_results)
            .await?;
        info!(results = results.len(), "search complete");

        let aggregator = KnowledgeAggregator::new(identity, &self.extraction);
        let mut kb = KnowledgeBase::new();
        let mut seen = HashSet::new();
        let deadline = self.research.connect_timeout + self.research.fetch_timeout;

        for result in results.iter().take(self.research.max_results) {
            if !seen.insert(result.url.as_str()) {
                continue;
            }

            let page = match fetch_with_deadline(&self.fetcher, &result.url, deadline).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(url = %result.url, error = %e, "fetch failed, skipping page");
                    report.pages_failed += 1;
                    continue;
                }
            };

            let added = self.process_page(&aggregator, &mut kb, &page).await;
            report.pages_processed += 1;
            info!(url = %page.url, added, total = kb.len(), "page processed");
        }

        let dropped = kb.sweep(&aggregator);
        debug!(dropped, kept = kb.len(), "final relevance sweep");

        let mut unified = FactFusion::default().fuse(kb.facts());
        sort_by_relevance(&mut unified);

        report.narrative = generate_narrative(&unified, identity);
        report.facts = kb.into_facts();
        report.unified = unified;

        info!(
            facts = report.facts.len(),
            unified = report.unified.len(),
            pages_processed = report.pages_processed,
            pages_failed = report.pages_failed,
            "research complete"
        );
        Ok(report)
    }

    /// Extract one page into the knowledge base; returns facts added.
    async fn process_page(
        &self,
        aggregator: &KnowledgeAggregator<'_>,
        kb: &mut KnowledgeBase,
        page: &FetchedPage,
    ) -> usize {
        let url = page.url.as_str();

        if !contains_any_keyword(&page.markup, &self.research.contact_keywords) {
            debug!(url = %url, "no contact keywords, scanning markup links only");
            return kb.extend(aggregator.scan_contacts(&page.markup, "", url));
        }

        let text = self.prepare_text(aggregator, &page.markup).await;
        kb.ingest_page(aggregator, &page.markup, &text, url)
    }

    /// Markup → bounded plain text ready for the aggregator.
    async fn prepare_text(&self, aggregator: &KnowledgeAggregator<'_>, markup: &str) -> String {
        let text =
            convert_with_timeout(self.converter.clone(), markup, self.research.parse_timeout).await;

        let text = if self.research.focus_context {
            focus_target_context(&text, aggregator.scorer(), self.extraction.strong_relevance)
        } else {
            text
        };

        let text = remove_noise_phrases(&text);
        truncate_chars(&text, self.extraction.max_content_chars).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{faculty_page, jane_doe, MockFetcher, MockSearcher};
    use crate::traits::searcher::SearchResult;

    #[tokio::test]
    async fn test_empty_identity_does_not_search() {
        let searcher = MockSearcher::new().failing("search must not run");
        let researcher = Researcher::new(searcher, MockFetcher::new());

        let report = researcher.run(&Identity::empty()).await.unwrap();
        assert!(report.is_empty());
        assert_eq!(report.pages_processed, 0);
    }

    #[tokio::test]
    async fn test_duplicate_results_fetched_once() {
        let url = "https://www.acme.edu/people/jdoe";
        let searcher = MockSearcher::new().with_results(vec![
            SearchResult::new(url),
            SearchResult::new(url),
        ]);
        let fetcher = MockFetcher::new().with_page(url, faculty_page());

        let report = Researcher::new(searcher, fetcher)
            .run(&jane_doe())
            .await
            .unwrap();
        assert_eq!(report.pages_processed, 1);
    }

    #[tokio::test]
    async fn test_pages_without_keywords_only_scan_links() {
        let url = "https://www.acme.edu/news";
        let markup = "<html><body><p>Jane Doe is a Professor at Acme University.</p></body></html>";
        let searcher = MockSearcher::new().with_urls(&[url]);
        let fetcher = MockFetcher::new().with_page(url, markup);

        let report = Researcher::new(searcher, fetcher)
            .run(&jane_doe())
            .await
            .unwrap();

        assert_eq!(report.pages_processed, 1);
        assert!(report.facts.is_empty());
    }
}
