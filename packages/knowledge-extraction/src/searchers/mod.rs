//! Web searcher implementations.

pub mod google;

pub use google::GoogleSearcher;
