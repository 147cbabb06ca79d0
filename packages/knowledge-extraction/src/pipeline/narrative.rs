//! Narrative generation: a readable paragraph from fused facts.

use crate::text::lower;
use crate::types::{Identity, UnifiedFact};

/// Designation words read as "X is <designation>" rather than "serves as".
const ROLE_NOUNS: &[&str] = &["professor", "lecturer", "assistant", "researcher"];

#[derive(Debug, Default)]
struct Slots<'a> {
    designation: Option<&'a str>,
    department: Option<&'a str>,
    education: Option<&'a str>,
    research: Vec<&'a str>,
    contacts: Vec<&'a str>,
    honors: Vec<&'a str>,
}

impl<'a> Slots<'a> {
    /// Fill slots from facts, most relevant first.
    fn collect(facts: &'a [UnifiedFact]) -> Self {
        let mut sorted: Vec<&UnifiedFact> = facts.iter().collect();
        sorted.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));

        let mut slots = Self::default();
        for fact in sorted {
            let category = lower(&fact.category);
            let value = clean(&fact.value);
            if value.is_empty() {
                continue;
            }
            let has = |needle: &str| category.contains(needle);

            if has("designation") || has("role") {
                slots.designation.get_or_insert(value);
            } else if has("department") {
                slots.department.get_or_insert(value);
            } else if has("education") || has("degree") {
                slots.education.get_or_insert(value);
            } else if has("research") || has("special") {
                push_unique(&mut slots.research, value);
            } else if has("contact") {
                push_unique(&mut slots.contacts, value);
            } else if has("honor") || has("award") {
                push_unique(&mut slots.honors, value);
            }
        }
        slots
    }
}

fn clean(value: &str) -> &str {
    value.trim().trim_end_matches(['.', ';', '!', '?']).trim_end()
}

fn push_unique<'a>(list: &mut Vec<&'a str>, value: &'a str) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Render fused facts as a paragraph.
///
/// Clauses are emitted in a fixed order (role, affiliation, research,
/// education, contacts, honors) and omitted when their slot is empty.
/// Deterministic for identical input.
pub fn generate_narrative(facts: &[UnifiedFact], identity: &Identity) -> String {
    let slots = Slots::collect(facts);
    let person = if identity.name().is_empty() {
        "This individual"
    } else {
        identity.name()
    };
    let department = slots
        .department
        .or_else(|| Some(identity.sub_unit()).filter(|s| !s.is_empty()));
    let organization = Some(identity.organization()).filter(|s| !s.is_empty());

    let mut clauses = Vec::new();

    let opening = match (slots.designation, department, organization) {
        (Some(designation), dept, _) => {
            let low = lower(designation);
            let verb = if ROLE_NOUNS.iter().any(|r| low.contains(r)) {
                "is"
            } else {
                "serves as"
            };
            match dept {
                Some(dept) => format!("{person} {verb} {designation} in {dept}."),
                None => format!("{person} {verb} {designation}."),
            }
        }
        (None, Some(dept), Some(org)) => format!("{person} is associated with the {dept} at {org}."),
        (None, Some(dept), None) => format!("{person} is associated with the {dept}."),
        (None, None, Some(org)) => format!("{person} is affiliated with {org}."),
        (None, None, None) => format!("{person} has public professional information available."),
    };
    clauses.push(opening);

    if !slots.research.is_empty() {
        clauses.push(format!(
            "Their research interests include {}.",
            slots.research.join(", ")
        ));
    }
    if let Some(education) = slots.education {
        clauses.push(format!("They hold {education}."));
    }
    if !slots.contacts.is_empty() {
        clauses.push(format!("Contact information: {}.", slots.contacts.join(", ")));
    }
    if !slots.honors.is_empty() {
        clauses.push(format!("Notable achievements: {}.", slots.honors.join("; ")));
    }

    clauses.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::category::{
        CONTACT_EMAIL, CONTACT_PHONE, DEPARTMENT, DESIGNATION, EDUCATION, HONORS, RESEARCH_INTEREST,
    };
    use crate::types::ExtractedFact;

    fn unified(category: &str, value: &str, score: u32) -> UnifiedFact {
        UnifiedFact::from_fact(&ExtractedFact::new(category, value, "https://a.edu").with_relevance(score))
    }

    #[test]
    fn test_full_narrative() {
        let facts = vec![
            unified(DESIGNATION, "Associate Professor", 40),
            unified(DESIGNATION, "Chair of admissions", 20),
            unified(DEPARTMENT, "Computer Science", 30),
            unified(RESEARCH_INTEREST, "quantum computing", 30),
            unified(RESEARCH_INTEREST, "cryptography.", 25),
            unified(EDUCATION, "a PhD from MIT", 30),
            unified(CONTACT_EMAIL, "jane@acme.edu", 30),
            unified(CONTACT_PHONE, "+1-555-123-4567", 20),
            unified(HONORS, "Fellow of the IEEE", 30),
        ];
        let id = Identity::new("Jane Doe", "Acme University", "");

        assert_eq!(
            generate_narrative(&facts, &id),
            "Jane Doe is Associate Professor in Computer Science. \
             Their research interests include quantum computing, cryptography. \
             They hold a PhD from MIT. \
             Contact information: jane@acme.edu, +1-555-123-4567. \
             Notable achievements: Fellow of the IEEE."
        );
    }

    #[test]
    fn test_highest_relevance_wins_slot() {
        let facts = vec![
            unified(DESIGNATION, "Lecturer", 15),
            unified(DESIGNATION, "Dean of Engineering", 45),
        ];
        let id = Identity::named("Jane Doe");
        assert_eq!(
            generate_narrative(&facts, &id),
            "Jane Doe serves as Dean of Engineering."
        );
    }

    #[test]
    fn test_affiliation_fallbacks() {
        let none: Vec<UnifiedFact> = vec![];

        let id = Identity::new("Jane Doe", "Acme University", "Physics");
        assert_eq!(
            generate_narrative(&none, &id),
            "Jane Doe is associated with the Physics at Acme University."
        );

        let id = Identity::new("Jane Doe", "Acme University", "");
        assert_eq!(generate_narrative(&none, &id), "Jane Doe is affiliated with Acme University.");

        assert_eq!(
            generate_narrative(&none, &Identity::empty()),
            "This individual has public professional information available."
        );
    }

    #[test]
    fn test_deterministic() {
        let facts = vec![
            unified(RESEARCH_INTEREST, "iot", 20),
            unified(RESEARCH_INTEREST, "machine learning", 20),
        ];
        let id = Identity::named("Jane Doe");
        let first = generate_narrative(&facts, &id);
        assert_eq!(first, generate_narrative(&facts, &id));
        assert!(first.contains("iot, machine learning"));
    }
}
