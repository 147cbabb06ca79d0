//! Testing utilities including mock collaborators and page fixtures.
//!
//! These let applications exercise the research pipeline without touching
//! the network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{ExtractionError, FetchError, FetchResult, Result};
use crate::pipeline::refine::RefinedProfile;
use crate::traits::{
    fetcher::{FetchedPage, PageFetcher},
    refiner::Refiner,
    searcher::{SearchResult, WebSearcher},
};
use crate::types::{ExtractedFact, Identity};

/// A mock web searcher.
///
/// Returns the same ranked results for every query unless per-query
/// results were registered.
#[derive(Default)]
pub struct MockSearcher {
    default_results: Vec<SearchResult>,
    by_query: HashMap<String, Vec<SearchResult>>,
    failure: Option<String>,

    /// Queries received, for assertions
    queries: Arc<RwLock<Vec<String>>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results returned for any query.
    pub fn with_results(mut self, results: Vec<SearchResult>) -> Self {
        self.default_results = results;
        self
    }

    /// URL strings returned for any query.
    pub fn with_urls(self, urls: &[&str]) -> Self {
        self.with_results(urls.iter().map(|u| SearchResult::new(*u)).collect())
    }

    /// Results returned for one exact query.
    pub fn with_query_results(mut self, query: impl Into<String>, results: Vec<SearchResult>) -> Self {
        self.by_query.insert(query.into(), results);
        self
    }

    /// Make every search fail.
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.read().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        self.queries.write().unwrap().push(query.to_string());

        if let Some(reason) = &self.failure {
            return Err(ExtractionError::Search {
                reason: reason.clone(),
            });
        }

        let results = self.by_query.get(query).unwrap_or(&self.default_results);
        Ok(results.iter().take(limit).cloned().collect())
    }
}

/// A mock page fetcher.
///
/// Unknown URLs answer 404; URLs marked with [`fail_url`](Self::fail_url)
/// fail at the transport level.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    fail_urls: Vec<String>,

    /// URLs requested, in order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `markup` for `url`.
    pub fn with_page(mut self, url: impl Into<String>, markup: impl Into<String>) -> Self {
        self.pages.insert(url.into(), markup.into());
        self
    }

    /// Mark a URL as unreachable.
    pub fn fail_url(mut self, url: impl Into<String>) -> Self {
        self.fail_urls.push(url.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());

        if self.fail_urls.iter().any(|u| u == url) {
            return Err(FetchError::Http(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Mock connection refused",
            ))));
        }

        self.pages
            .get(url)
            .map(|markup| FetchedPage::new(url, markup.clone()).with_content_type("text/html"))
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// A mock refiner returning a canned profile (or failing).
#[derive(Default)]
pub struct MockRefiner {
    profile: RefinedProfile,
    failure: Option<String>,
    unparsable: Option<String>,

    /// Fact counts received, one per call
    calls: Arc<RwLock<Vec<usize>>>,
}

impl MockRefiner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: RefinedProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Answer with a reply that is not a profile.
    pub fn with_unparsable_reply(mut self, raw: impl Into<String>) -> Self {
        self.unparsable = Some(raw.into());
        self
    }

    pub fn calls(&self) -> Vec<usize> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Refiner for MockRefiner {
    async fn refine(&self, _identity: &Identity, facts: &[ExtractedFact]) -> Result<RefinedProfile> {
        self.calls.write().unwrap().push(facts.len());
        if let Some(reason) = &self.failure {
            return Err(ExtractionError::Refine {
                reason: reason.clone(),
            });
        }
        if let Some(raw) = &self.unparsable {
            return Err(ExtractionError::UnparsableReply {
                reason: "no JSON object in reply".to_string(),
                raw: raw.clone(),
            });
        }
        Ok(self.profile.clone())
    }
}

/// Identity used across the fixtures.
pub fn jane_doe() -> Identity {
    Identity::new("Jane Doe", "Acme University", "")
}

/// Faculty profile for [`jane_doe`], with a colleague's entry and site
/// boilerplate mixed in.
pub fn faculty_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head>
  <title>Jane Doe | Acme University</title>
  <script>window.analytics = { contact: "tracker@ads.example" };</script>
</head>
<body>
  <nav><a href="/">Home</a> <a href="/people">Faculty Profiles</a></nav>
  <main>
    <h1>Dr. Jane Doe</h1>
    <p>Jane Doe is a Professor in the Computer Science department.</p>
    <p>Jane Doe holds a PhD in Computer Science from MIT.</p>
    <p>Contact Jane Doe: <a href="mailto:jane.doe@acme.edu?subject=Hello">jane.doe@acme.edu</a>, phone +1-555-123-4567</p>
    <h2>Colleagues</h2>
    <p>John Smith is a Lecturer in the History department. Email: jsmith@acme.edu</p>
  </main>
  <footer>Copyright Acme University. All rights reserved.</footer>
</body>
</html>"#
        .to_string()
}

/// A departmental listing that mentions several people.
pub fn directory_page() -> String {
    r#"<html><body>
  <h1>Computer Science Faculty</h1>
  <ul>
    <li>Jane Doe, Professor. Email: <a href="mailto:jane.doe@acme.edu">jane.doe@acme.edu</a></li>
  </ul>
</body></html>"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_searcher() {
        let searcher = MockSearcher::new()
            .with_urls(&["https://a.edu", "https://b.edu", "https://c.edu"])
            .with_query_results("special", vec![SearchResult::new("https://z.edu")]);

        let results = searcher.search("Jane Doe", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://a.edu");

        let results = searcher.search("special", 5).await.unwrap();
        assert_eq!(results[0].url, "https://z.edu");

        assert_eq!(searcher.queries(), vec!["Jane Doe", "special"]);
    }

    #[tokio::test]
    async fn test_mock_fetcher() {
        let fetcher = MockFetcher::new()
            .with_page("https://a.edu", "<p>hi</p>")
            .fail_url("https://down.edu");

        assert_eq!(fetcher.fetch("https://a.edu").await.unwrap().markup, "<p>hi</p>");
        assert!(matches!(
            fetcher.fetch("https://missing.edu").await,
            Err(FetchError::Status { status: 404, .. })
        ));
        assert!(matches!(
            fetcher.fetch("https://down.edu").await,
            Err(FetchError::Http(_))
        ));
        assert_eq!(fetcher.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_refiner() {
        let facts = vec![ExtractedFact::new("Misc", "x", "u")];

        let refiner = MockRefiner::new().failing("quota");
        tokio_test::assert_err!(refiner.refine(&jane_doe(), &facts).await);
        assert_eq!(refiner.calls(), vec![1]);

        let profile = tokio_test::assert_ok!(MockRefiner::new().refine(&jane_doe(), &facts).await);
        assert!(profile.is_empty());
    }
}
