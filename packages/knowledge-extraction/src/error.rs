//! Typed errors for the knowledge extraction library.
//!
//! The extraction engine itself never fails: it works on in-memory strings
//! and degrades to empty output. These errors belong to the collaborators
//! around it (page fetching, web search, LLM refinement).

use thiserror::Error;

/// Errors raised by the research pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Page fetch failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Web search failed or returned an API error
    #[error("search failed: {reason}")]
    Search { reason: String },

    /// LLM refinement failed
    #[error("refinement failed: {reason}")]
    Refine { reason: String },

    /// The refiner answered but the reply held no usable profile
    #[error("refiner reply could not be parsed: {reason}")]
    UnparsableReply { reason: String, raw: String },

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ExtractionError {
    /// The model's raw reply, when refinement failed on parsing it.
    pub fn raw_reply(&self) -> Option<&str> {
        match self {
            Self::UnparsableReply { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Errors that can occur while fetching a single page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Security validation failed
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Body exceeded the download budget
    #[error("download exceeded {limit} bytes: {url}")]
    TooLarge { url: String, limit: usize },

    /// Connection or transfer timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Redirect target could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Redirect chain longer than the limit
    #[error("more than {limit} redirects: {url}")]
    TooManyRedirects { url: String, limit: usize },
}

/// Security-related errors, primarily for SSRF protection.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// URL scheme not allowed (e.g., file://, ftp://)
    #[error("disallowed URL scheme: {0}")]
    DisallowedScheme(String),

    /// Host is blocked (e.g., localhost, metadata endpoints)
    #[error("blocked host: {0}")]
    BlockedHost(String),

    /// IP in blocked CIDR range (e.g., 10.0.0.0/8)
    #[error("blocked IP range: {0}")]
    BlockedCidr(String),

    /// URL has no host
    #[error("URL has no host")]
    NoHost,

    /// Host name could not be resolved
    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for security operations.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;
