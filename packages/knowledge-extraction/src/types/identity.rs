//! The search target: a person, optionally qualified by organization and sub-unit.

use serde::{Deserialize, Serialize};

use crate::text;

/// Minimum length of a word kept as a matchable part.
const MIN_PART_LEN: usize = 2;

/// Identity of the person being researched.
///
/// Built once per run from user input and never mutated. The `*_parts`
/// decompositions are derived on construction: lowercase words of at least
/// two characters with edge punctuation stripped.
///
/// # Example
///
/// ```rust
/// use knowledge_extraction::Identity;
///
/// let id = Identity::new("Dr. Jane Doe", "Acme University", "");
/// assert_eq!(id.name_parts(), ["dr", "jane", "doe"]);
/// assert!(!id.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IdentityFields", into = "IdentityFields")]
pub struct Identity {
    name: String,
    organization: String,
    sub_unit: String,
    name_parts: Vec<String>,
    organization_parts: Vec<String>,
    sub_unit_parts: Vec<String>,
}

/// Serialized form of [`Identity`]; parts are re-derived on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IdentityFields {
    #[serde(default)]
    name: String,
    #[serde(default)]
    organization: String,
    #[serde(default)]
    sub_unit: String,
}

impl From<IdentityFields> for Identity {
    fn from(f: IdentityFields) -> Self {
        Identity::new(f.name, f.organization, f.sub_unit)
    }
}

impl From<Identity> for IdentityFields {
    fn from(id: Identity) -> Self {
        Self {
            name: id.name,
            organization: id.organization,
            sub_unit: id.sub_unit,
        }
    }
}

impl Identity {
    /// Create an identity. Surrounding whitespace is trimmed from every field.
    pub fn new(
        name: impl Into<String>,
        organization: impl Into<String>,
        sub_unit: impl Into<String>,
    ) -> Self {
        let name = name.into().trim().to_string();
        let organization = organization.into().trim().to_string();
        let sub_unit = sub_unit.into().trim().to_string();

        Self {
            name_parts: text::word_parts(&name, MIN_PART_LEN),
            organization_parts: text::word_parts(&organization, MIN_PART_LEN),
            sub_unit_parts: text::word_parts(&sub_unit, MIN_PART_LEN),
            name,
            organization,
            sub_unit,
        }
    }

    /// Identity with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, "", "")
    }

    /// An identity with no fields; disables relevance filtering.
    pub fn empty() -> Self {
        Self::new("", "", "")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn sub_unit(&self) -> &str {
        &self.sub_unit
    }

    pub fn name_parts(&self) -> &[String] {
        &self.name_parts
    }

    pub fn organization_parts(&self) -> &[String] {
        &self.organization_parts
    }

    pub fn sub_unit_parts(&self) -> &[String] {
        &self.sub_unit_parts
    }

    /// True when no field is set ("no filter requested").
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.organization.is_empty() && self.sub_unit.is_empty()
    }

    /// Non-empty identity terms with their parts, in priority order
    /// (name, organization, sub-unit).
    pub fn terms(&self) -> impl Iterator<Item = (&str, &[String])> {
        [
            (self.name.as_str(), self.name_parts.as_slice()),
            (self.organization.as_str(), self.organization_parts.as_slice()),
            (self.sub_unit.as_str(), self.sub_unit_parts.as_slice()),
        ]
        .into_iter()
        .filter(|(term, _)| !term.is_empty())
    }

    /// Web search query built from the non-empty fields.
    pub fn search_query(&self) -> String {
        self.terms()
            .map(|(term, _)| term)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::empty()
    }
}
