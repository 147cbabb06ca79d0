//! Fact records produced by the aggregator and the fusion engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How strongly a fact is tied to the identity.
///
/// Serialized as the integers 1, 2, 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Confidence {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Confidence {
    /// Map a relevance score onto a confidence level.
    pub fn from_relevance(score: u32, high_at: u32, medium_at: u32) -> Self {
        if score >= high_at {
            Self::High
        } else if score >= medium_at {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::Low
    }
}

impl From<Confidence> for u8 {
    fn from(c: Confidence) -> Self {
        c.as_u8()
    }
}

impl TryFrom<u8> for Confidence {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(format!("confidence must be 1, 2 or 3, got {other}")),
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(label)
    }
}

/// A snippet judged relevant to the identity, from one source page.
///
/// Created by the aggregator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFact {
    /// Semantic category ("Designation", "Contact/Email", "Misc", ...)
    pub category: String,

    /// The snippet itself; never empty
    pub value: String,

    /// Page the snippet came from
    pub source_url: String,

    pub confidence: Confidence,

    /// Relevance score of the evidence the fact was admitted on
    pub relevance_score: u32,

    /// Evidence window for facts whose value is not self-describing
    /// (contacts). The final sweep re-scores this instead of `value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ExtractedFact {
    /// Create a fact with low confidence and zero relevance.
    pub fn new(
        category: impl Into<String>,
        value: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            value: value.into(),
            source_url: source_url.into(),
            confidence: Confidence::Low,
            relevance_score: 0,
            context: None,
        }
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_relevance(mut self, score: u32) -> Self {
        self.relevance_score = score;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The text the relevance gate should judge for this fact.
    pub fn evidence(&self) -> &str {
        self.context.as_deref().unwrap_or(&self.value)
    }
}

/// A fact corroborated across one or more sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedFact {
    pub category: String,

    /// Representative value (the first value seen for the cluster)
    pub value: String,

    /// Every page that contributed; never empty
    pub sources: BTreeSet<String>,

    /// Maximum confidence over merged facts
    pub confidence: Confidence,

    /// Maximum relevance score over merged facts
    pub relevance_score: u32,
}

impl UnifiedFact {
    /// Start a cluster from a single extracted fact.
    pub fn from_fact(fact: &ExtractedFact) -> Self {
        Self {
            category: fact.category.clone(),
            value: fact.value.clone(),
            sources: BTreeSet::from([fact.source_url.clone()]),
            confidence: fact.confidence,
            relevance_score: fact.relevance_score,
        }
    }

    /// Fold another extracted fact into this cluster.
    pub fn absorb(&mut self, fact: &ExtractedFact) {
        self.sources.insert(fact.source_url.clone());
        self.confidence = self.confidence.max(fact.confidence);
        self.relevance_score = self.relevance_score.max(fact.relevance_score);
    }

    /// Fold another cluster into this one.
    pub fn absorb_unified(&mut self, other: UnifiedFact) {
        self.sources.extend(other.sources);
        self.confidence = self.confidence.max(other.confidence);
        self.relevance_score = self.relevance_score.max(other.relevance_score);
    }

    /// Number of distinct sources corroborating this fact.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn is_corroborated(&self) -> bool {
        self.sources.len() >= 2
    }
}

/// Flatten a unified fact back into a single-source fact (its first source).
impl From<&UnifiedFact> for ExtractedFact {
    fn from(u: &UnifiedFact) -> Self {
        Self {
            category: u.category.clone(),
            value: u.value.clone(),
            source_url: u.sources.iter().next().cloned().unwrap_or_default(),
            confidence: u.confidence,
            relevance_score: u.relevance_score,
            context: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_from_relevance() {
        assert_eq!(Confidence::from_relevance(45, 30, 20), Confidence::High);
        assert_eq!(Confidence::from_relevance(30, 30, 20), Confidence::High);
        assert_eq!(Confidence::from_relevance(20, 30, 20), Confidence::Medium);
        assert_eq!(Confidence::from_relevance(19, 30, 20), Confidence::Low);
    }

    #[test]
    fn test_confidence_serializes_as_integer() {
        let fact = ExtractedFact::new("Education", "PhD in Physics", "https://a.edu")
            .with_confidence(Confidence::Medium)
            .with_relevance(22);

        let json = serde_json::to_value(&fact).unwrap();
        assert_eq!(json["confidence"], 2);
        assert_eq!(json["relevance_score"], 22);
        assert!(json.get("context").is_none());

        let bad = r#"{"category":"x","value":"y","source_url":"z","confidence":7,"relevance_score":0}"#;
        assert!(serde_json::from_str::<ExtractedFact>(bad).is_err());
    }

    #[test]
    fn test_evidence_prefers_context() {
        let plain = ExtractedFact::new("Misc", "line", "u");
        assert_eq!(plain.evidence(), "line");

        let contact = ExtractedFact::new("Contact/Email", "a@b.co", "u").with_context("Jane Doe a@b.co");
        assert_eq!(contact.evidence(), "Jane Doe a@b.co");
    }

    #[test]
    fn test_unified_absorb_takes_maxima() {
        let a = ExtractedFact::new("Education", "PhD", "https://a")
            .with_confidence(Confidence::Low)
            .with_relevance(12);
        let b = ExtractedFact::new("Education", "PhD", "https://b")
            .with_confidence(Confidence::High)
            .with_relevance(8);

        let mut unified = UnifiedFact::from_fact(&a);
        unified.absorb(&b);

        assert_eq!(unified.source_count(), 2);
        assert!(unified.is_corroborated());
        assert_eq!(unified.confidence, Confidence::High);
        assert_eq!(unified.relevance_score, 12);
        assert_eq!(unified.value, "PhD");
    }
}
