//! Interfaces to the collaborators around the engine.
//!
//! Applications implement these to provide search, page retrieval and
//! optional LLM refinement.

pub mod fetcher;
pub mod refiner;
pub mod searcher;

pub use fetcher::{FetchedPage, PageFetcher};
pub use refiner::Refiner;
pub use searcher::{SearchResult, WebSearcher};
