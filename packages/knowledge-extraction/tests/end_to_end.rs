//! A single faculty page run through the engine by hand.

use knowledge_extraction::pipeline::{fuse_facts, generate_narrative, KnowledgeAggregator, KnowledgeBase};
use knowledge_extraction::types::category::{CONTACT_EMAIL, DEPARTMENT, DESIGNATION};
use knowledge_extraction::{Confidence, ExtractionConfig, Identity};

const URL: &str = "https://www.acme.edu/people/jdoe";
const PAGE: &str =
    "Dr. Jane Doe is a Professor in the Computer Science department. Contact: jane.doe@acme.edu";

fn run(identity: &Identity, text: &str) -> KnowledgeBase {
    let config = ExtractionConfig::default();
    let aggregator = KnowledgeAggregator::new(identity, &config);
    let mut kb = KnowledgeBase::new();
    kb.ingest_page(&aggregator, "", text, URL);
    kb.sweep(&aggregator);
    kb
}

#[test]
fn faculty_sentence_yields_role_department_and_email() {
    let identity = Identity::new("Jane Doe", "Acme University", "");
    let kb = run(&identity, PAGE);

    let of = |category: &str| {
        kb.facts()
            .iter()
            .filter(|f| f.category == category)
            .collect::<Vec<_>>()
    };

    let designation = of(DESIGNATION);
    assert_eq!(designation.len(), 1);
    assert_eq!(designation[0].confidence, Confidence::High);

    assert_eq!(of(DEPARTMENT).len(), 1);

    let email = of(CONTACT_EMAIL);
    assert_eq!(email.len(), 1);
    assert_eq!(email[0].value, "jane.doe@acme.edu");

    assert_eq!(kb.len(), 3);
    assert!(kb.facts().iter().all(|f| f.source_url == URL));

    let json = serde_json::to_value(&kb).unwrap();
    let designation_json = json
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["category"] == DESIGNATION)
        .unwrap();
    assert_eq!(designation_json["confidence"], 3);
}

#[test]
fn other_people_on_the_page_are_ignored() {
    let identity = Identity::new("Jane Doe", "Acme University", "");
    let text = format!(
        "{PAGE}\nJohn Smith is a Lecturer in the History department.{} Email: jsmith@history.example",
        " ".repeat(250)
    );
    let kb = run(&identity, &text);

    assert!(kb.facts().iter().all(|f| !f.value.contains("John Smith")));
    assert!(kb.facts().iter().all(|f| f.value != "jsmith@history.example"));
}

#[test]
fn empty_identity_accepts_every_line() {
    let kb = run(&Identity::empty(), "First line.\nSecond line!\n\n");

    assert_eq!(kb.len(), 2);
    assert!(kb.facts().iter().all(|f| f.confidence == Confidence::Low));
}

#[test]
fn fused_facts_render_a_narrative() {
    let identity = Identity::new("Jane Doe", "Acme University", "");
    let kb = run(&identity, PAGE);

    let unified = fuse_facts(kb.facts());
    assert_eq!(unified.len(), 3);

    let narrative = generate_narrative(&unified, &identity);
    assert!(narrative.starts_with("Jane Doe is "));
    assert!(narrative.contains("Contact information: jane.doe@acme.edu."));
    assert_eq!(narrative, generate_narrative(&unified, &identity));
}
