//! Page fetcher implementations.

pub mod http;

pub use http::{fetch_with_deadline, HttpFetcher};
