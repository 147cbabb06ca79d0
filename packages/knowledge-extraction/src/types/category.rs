//! Category names and the keyword table used by the classifier.

use serde::{Deserialize, Serialize};

use crate::text::lower;

pub const DESIGNATION: &str = "Designation";
pub const DEPARTMENT: &str = "Department";
pub const EDUCATION: &str = "Education";
pub const RESEARCH_INTEREST: &str = "Research Interest";
pub const TIMELINE: &str = "Timeline";
pub const FAMILY: &str = "Family";
pub const PROFILE_LINKS: &str = "Profile Links";
pub const HONORS: &str = "Honors/Awards";

/// Reserved category for relevant lines with no keyword category.
pub const MISC: &str = "Misc";
pub const CONTACT_EMAIL: &str = "Contact/Email";
pub const CONTACT_PHONE: &str = "Contact/Phone";

/// A category and the lowercase substrings that trigger it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    /// Keywords are lowercased on construction.
    pub fn new(name: impl Into<String>, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            keywords: keywords
                .into_iter()
                .map(|k| lower(&k.into()))
                .collect(),
        }
    }
}

/// Ordered category → keyword table.
///
/// Order matters: on equal weighted scores the earlier rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
}

impl CategoryTable {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// Append a rule at the end of the table.
    pub fn with_rule(
        mut self,
        name: impl Into<String>,
        keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.rules.push(CategoryRule::new(name, keywords));
        self
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(vec![
            CategoryRule::new(
                DESIGNATION,
                [
                    "professor",
                    "lecturer",
                    "assistant professor",
                    "associate professor",
                    "assistant",
                    "associate",
                    "hod",
                    "head of",
                    "dean",
                    "chair",
                    "faculty",
                    "postdoc",
                    "researcher",
                    "instructor",
                ],
            ),
            CategoryRule::new(
                DEPARTMENT,
                [
                    "department",
                    "dept.",
                    "csit",
                    "computer science",
                    "computer & it",
                    "computer science & it",
                    "informatics",
                    "electrical",
                    "mechanical",
                    "mathematics",
                    "physics",
                ],
            ),
            CategoryRule::new(
                EDUCATION,
                [
                    "phd", "ph.d", "doctorate", "ms", "msc", "m.sc", "bs", "bsc", "b.s.", "b.s",
                    "degree", "graduat", "master", "bachelor",
                ],
            ),
            CategoryRule::new(
                RESEARCH_INTEREST,
                [
                    "research",
                    "interest",
                    "specializ",
                    "specialise",
                    "focus",
                    "quantum",
                    "cryptography",
                    "iot",
                    "machine learning",
                    "deep learning",
                    "computer vision",
                ],
            ),
            CategoryRule::new(
                TIMELINE,
                [
                    "joined",
                    "appointed",
                    "since",
                    "from",
                    "started",
                    "began",
                    "effective",
                    "onward",
                    "promoted",
                    "served as",
                ],
            ),
            CategoryRule::new(
                FAMILY,
                ["son of", "s/o", "father", "mother", "parents", "parent", "wife", "husband"],
            ),
            CategoryRule::new(
                PROFILE_LINKS,
                [
                    "google scholar",
                    "scholar.google",
                    "researchgate",
                    "linkedin",
                    "orcid",
                    "cv",
                    "resume",
                ],
            ),
            CategoryRule::new(
                HONORS,
                ["award", "fellow", "honor", "distinction", "prize", "awardee"],
            ),
        ])
    }
}
