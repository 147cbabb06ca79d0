//! Refiner trait: optional LLM pass over the final knowledge base.

use async_trait::async_trait;

use crate::error::Result;
use crate::pipeline::refine::RefinedProfile;
use crate::types::{ExtractedFact, Identity};

/// Re-validates and restructures facts into a [`RefinedProfile`].
///
/// The engine treats the output as opaque; a failure leaves the unrefined
/// knowledge base in place.
#[async_trait]
pub trait Refiner: Send + Sync {
    async fn refine(&self, identity: &Identity, facts: &[ExtractedFact]) -> Result<RefinedProfile>;
}
