//! Google Custom Search JSON API.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ExtractionError, Result};
use crate::security::SearchCredentials;
use crate::traits::searcher::{SearchResult, WebSearcher};

const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// The API returns at most ten items per request.
const MAX_PER_REQUEST: usize = 10;

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    items: Vec<Item>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Item {
    link: Option<String>,
    title: Option<String>,
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

/// Web searcher backed by a Google programmable search engine.
pub struct GoogleSearcher {
    credentials: SearchCredentials,
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleSearcher {
    pub fn new(credentials: SearchCredentials) -> Self {
        Self {
            credentials,
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Point at a different endpoint (proxies, test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

fn search_error(reason: impl Into<String>) -> ExtractionError {
    ExtractionError::Search {
        reason: reason.into(),
    }
}

/// Turn a raw API body into ranked results.
///
/// Items without a link are skipped; an `error` object is reported as a
/// search failure.
pub(crate) fn parse_search_response(body: &str, limit: usize) -> Result<Vec<SearchResult>> {
    let response: Response = serde_json::from_str(body)?;

    if let Some(err) = response.error {
        return Err(search_error(format!("API error {}: {}", err.code, err.message)));
    }

    Ok(response
        .items
        .into_iter()
        .filter_map(|item| {
            let link = item.link.filter(|l| !l.trim().is_empty())?;
            let mut result = SearchResult::new(link);
            if let Some(title) = item.title {
                result = result.with_title(title);
            }
            if let Some(snippet) = item.snippet {
                result = result.with_snippet(snippet);
            }
            Some(result)
        })
        .take(limit)
        .collect())
}

#[async_trait]
impl WebSearcher for GoogleSearcher {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        if limit == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let num = limit.min(MAX_PER_REQUEST).to_string();

        debug!(query = %query, num = %num, "google search");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.credentials.api_key.expose()),
                ("cx", self.credentials.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| search_error(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| search_error(e.to_string()))?;

        // Error bodies carry a useful message, so parse before checking status
        match parse_search_response(&body, limit) {
            Ok(results) if status.is_success() => {
                debug!(query = %query, results = results.len(), "google search complete");
                Ok(results)
            }
            Ok(_) => Err(search_error(format!("HTTP {status}"))),
            Err(e) => {
                warn!(status = %status, error = %e, "google search failed");
                Err(e)
            }
        }
    }
}
