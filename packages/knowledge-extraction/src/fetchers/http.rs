//! HTTP page fetcher built on reqwest.

use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::security::UrlValidator;
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::types::ResearchConfig;

const MAX_REDIRECTS: usize = 10;

/// Fetches pages over HTTP with connect/total timeouts and a download cap.
///
/// Every URL passes the [`UrlValidator`] (including DNS) before a request is
/// made. Redirects are followed here rather than by reqwest so each hop is
/// validated the same way. Bodies are streamed so an oversized page is
/// abandoned as soon as it crosses the limit.
///
/// # Example
///
/// ```rust,ignore
/// use knowledge_extraction::fetchers::HttpFetcher;
/// use knowledge_extraction::types::ResearchConfig;
///
/// let fetcher = HttpFetcher::new(&ResearchConfig::default())?;
/// let page = fetcher.fetch("https://www.acme.edu/people/jdoe").await?;
/// ```
pub struct HttpFetcher {
    client: reqwest::Client,
    validator: UrlValidator,
    max_bytes: usize,
    resolve_dns: bool,
}

impl HttpFetcher {
    /// Build a fetcher from the research settings.
    pub fn new(config: &ResearchConfig) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            validator: UrlValidator::new(),
            max_bytes: config.max_download_bytes,
            resolve_dns: true,
        })
    }

    /// Replace the URL validator.
    pub fn with_validator(mut self, validator: UrlValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Skip the DNS check (static validation still applies).
    pub fn without_dns_check(mut self) -> Self {
        self.resolve_dns = false;
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    async fn check(&self, url: &str) -> FetchResult<Url> {
        let parsed = if self.resolve_dns {
            self.validator.validate_with_dns(url).await?
        } else {
            self.validator.validate(url)?
        };
        Ok(parsed)
    }

    /// Send a GET, following redirects through the validator.
    async fn send(&self, url: &str) -> FetchResult<reqwest::Response> {
        let mut current = self.check(url).await?;

        for _ in 0..=MAX_REDIRECTS {
            let response = self.client.get(current.clone()).send().await.map_err(|e| {
                warn!(url = %current, error = %e, "HTTP request failed");
                Self::map_reqwest(url, e)
            })?;

            if !response.status().is_redirection() {
                return Ok(response);
            }
            let Some(location) = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
            else {
                return Ok(response);
            };

            let next = current
                .join(&location)
                .map_err(|_| FetchError::InvalidUrl { url: location })?;
            debug!(from = %current, to = %next, "following redirect");
            current = self.check(next.as_str()).await.map_err(|e| {
                warn!(url = %url, redirect = %next, error = %e, "redirect target rejected");
                e
            })?;
        }

        Err(FetchError::TooManyRedirects {
            url: url.to_string(),
            limit: MAX_REDIRECTS,
        })
    }

    fn map_reqwest(url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Http(Box::new(e))
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        debug!(url = %url, "HTTP fetch starting");
        let mut response = self.send(url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if let Some(len) = response.content_length() {
            if len as usize > self.max_bytes {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    limit: self.max_bytes,
                });
            }
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Self::map_reqwest(url, e))?
        {
            if body.len() + chunk.len() > self.max_bytes {
                warn!(url = %url, limit = self.max_bytes, "download limit exceeded");
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url = %url, bytes = body.len(), "HTTP fetch complete");

        let mut page = FetchedPage::new(url, String::from_utf8_lossy(&body).into_owned())
            .with_final_url(final_url)
            .with_fetched_at(Utc::now());
        if let Some(ct) = content_type {
            page = page.with_content_type(ct);
        }
        Ok(page)
    }
}

/// Timeout helper for callers wrapping their own fetchers.
pub async fn fetch_with_deadline<F: PageFetcher + ?Sized>(
    fetcher: &F,
    url: &str,
    deadline: Duration,
) -> FetchResult<FetchedPage> {
    match tokio::time::timeout(deadline, fetcher.fetch(url)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            url: url.to_string(),
        }),
    }
}
