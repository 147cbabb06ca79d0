//! Targeted Knowledge Extraction Library
//!
//! Finds public facts about one named person (optionally qualified by an
//! organization and sub-unit) on web pages, keeping only what can be
//! attributed to that person rather than to everyone else on the page.
//!
//! # Design Philosophy
//!
//! - The engine is pure: strings in, facts out, nothing fails
//! - Search, fetching and LLM refinement sit behind traits
//! - Heuristic weights and keyword tables are configuration, not code
//!
//! # Usage
//!
//! ```rust
//! use knowledge_extraction::pipeline::{fuse_facts, KnowledgeAggregator, KnowledgeBase};
//! use knowledge_extraction::{ExtractionConfig, Identity};
//!
//! let identity = Identity::new("Jane Doe", "Acme University", "");
//! let config = ExtractionConfig::default();
//! let aggregator = KnowledgeAggregator::new(&identity, &config);
//!
//! let text = "Dr. Jane Doe is a Professor in the Computer Science department. \
//!             Contact: jane.doe@acme.edu";
//! let mut kb = KnowledgeBase::new();
//! kb.ingest_page(&aggregator, "", text, "https://acme.edu/jdoe");
//! kb.sweep(&aggregator);
//!
//! let unified = fuse_facts(kb.facts());
//! assert!(unified.iter().any(|f| f.value == "jane.doe@acme.edu"));
//! ```
//!
//! # Modules
//!
//! - [`pipeline`] - Segmentation, scoring, aggregation, fusion, narrative
//! - [`types`] - Identity, facts, and configuration
//! - [`traits`] - Collaborator interfaces (WebSearcher, PageFetcher, Refiner)
//! - [`converters`] - Markup-to-text conversion with a deadline
//! - [`fetchers`], [`searchers`], [`refiners`] - HTTP-backed collaborators
//! - [`security`] - Credential handling and SSRF protection
//! - [`testing`] - Mock collaborators and fixtures

pub mod converters;
pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod refiners;
pub mod searchers;
pub mod security;
pub mod testing;
pub mod text;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ExtractionError, FetchError, SecurityError};
pub use pipeline::{KnowledgeAggregator, KnowledgeBase, RefinedProfile, ResearchReport, Researcher};
pub use traits::{
    fetcher::{FetchedPage, PageFetcher},
    refiner::Refiner,
    searcher::{SearchResult, WebSearcher},
};
pub use types::{
    category::{CategoryRule, CategoryTable},
    config::{ExtractionConfig, RelevanceWeights, ResearchConfig},
    fact::{Confidence, ExtractedFact, UnifiedFact},
    identity::Identity,
};
