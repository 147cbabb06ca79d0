//! Data types for the extraction engine.

pub mod category;
pub mod config;
pub mod fact;
pub mod identity;

pub use category::{CategoryRule, CategoryTable};
pub use config::{ExtractionConfig, RelevanceWeights, ResearchConfig};
pub use fact::{Confidence, ExtractedFact, UnifiedFact};
pub use identity::Identity;
