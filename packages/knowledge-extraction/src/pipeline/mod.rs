//! Extraction pipeline - the core of the library.
//!
//! The engine stages, in the order a page flows through them:
//! - Segmentation of page text into candidate lines
//! - Relevance scoring against the identity
//! - Category classification
//! - Contact detection (scheme links and bare tokens)
//! - Aggregation into a knowledge base, with a final relevance sweep
//! - Fusion of near-duplicate facts across pages
//! - Narrative rendering and optional LLM refinement
//!
//! [`research`] wires the stages to a searcher and a fetcher.

pub mod aggregate;
pub mod classify;
pub mod contacts;
pub mod context;
pub mod fusion;
pub mod narrative;
pub mod refine;
pub mod relevance;
pub mod research;
pub mod segment;

pub use aggregate::{locate_contact, KnowledgeAggregator, KnowledgeBase};
pub use classify::{keyword_weight, CategoryClassifier};
pub use contacts::{
    looks_like_email, looks_like_phone, ContactCandidate, ContactDetector, ContactKind,
    ContactSource,
};
pub use context::{
    contains_any_keyword, focus_target_context, remove_noise_phrases, strip_tags, truncate_chars,
};
pub use fusion::{fuse_facts, roughly_same, sort_by_relevance, word_overlap, FactFusion};
pub use narrative::generate_narrative;
pub use refine::{
    extract_first_json_object, format_refine_prompt, parse_refined_profile, RefinedProfile,
    REFINE_PROMPT,
};
pub use relevance::RelevanceScorer;
pub use research::{ResearchReport, Researcher};
pub use segment::{segment, Segmenter};
