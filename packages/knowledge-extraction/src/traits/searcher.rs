//! Web searcher trait for discovering candidate pages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,

    /// Title of the page (if available from search results).
    pub title: Option<String>,

    /// Snippet/description from search results.
    pub snippet: Option<String>,
}

impl SearchResult {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            snippet: None,
        }
    }

    /// Add a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

/// Web search for open-world discovery.
///
/// # Implementations
///
/// - `GoogleSearcher` - Google Custom Search JSON API
/// - `MockSearcher` - For testing
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search the web, returning at most `limit` results in rank order.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;
}
