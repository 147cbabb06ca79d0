//! Page fetcher trait: retrieves raw markup for a URL.
//!
//! The engine never fetches anything itself; the research pipeline asks a
//! `PageFetcher` for each search result and hands the markup on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchResult;

/// A fetched page, before any conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,

    /// URL after redirects
    pub final_url: String,

    /// Raw body (usually HTML)
    pub markup: String,

    /// MIME type from the response, if any
    pub content_type: Option<String>,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, markup: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            markup: markup.into(),
            content_type: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn with_final_url(mut self, url: impl Into<String>) -> Self {
        self.final_url = url.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = fetched_at;
        self
    }

    /// Check if the body looks like HTML.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(ct) => ct.contains("html"),
            None => self.markup.trim_start().starts_with('<'),
        }
    }
}

/// Retrieves pages with size and time bounds.
///
/// Retries, timeouts and download limits are the implementation's job.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;
}
