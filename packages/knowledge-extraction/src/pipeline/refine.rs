//! Refinement prompt and response parsing for an LLM fact validator.
//!
//! The engine only builds the prompt and parses the reply; talking to a
//! model is the job of a [`Refiner`](crate::traits::refiner::Refiner).

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::types::ExtractedFact;

/// Prompt asking a model to validate and merge the knowledge base.
pub const REFINE_PROMPT: &str = r#"You are a fact validator and refiner.
Below is a list of extracted facts about a person from various web sources.
Each fact has a category, raw value, and source.
Your task: clean, deduplicate, validate, and merge them into a single structured JSON.
If facts are incomplete or redundant, fix them. If something important seems missing, add it.
Return JSON only, with keys: name, department, university, designation, contact_emails, contact_phones, research_interests, education, awards, location, and others.
Respond with ONE and ONLY ONE valid JSON object.
Do not include explanations, comments, text, or code fences.
Output MUST start with '{' and end with '}'.
Follow this JSON schema exactly:
{
  "name": string,
  "department": string,
  "university": string,
  "designation": string,
  "contact_emails": [string],
  "contact_phones": [string],
  "research_interests": [string],
  "education": [string],
  "awards": [string],
  "location": string,
  "others": [string]
}

Facts:
{facts}"#;

/// Format the refine prompt with the knowledge base.
pub fn format_refine_prompt(facts: &[ExtractedFact]) -> String {
    let facts_text = facts
        .iter()
        .map(|f| format!("- [{}] {} (source: {})\n", f.category, f.value, f.source_url))
        .collect::<String>();

    REFINE_PROMPT.replace("{facts}", &facts_text)
}

/// Structured profile returned by the refiner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinedProfile {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub department: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub university: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub designation: String,
    #[serde(deserialize_with = "one_or_many")]
    pub contact_emails: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub contact_phones: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub research_interests: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub education: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub awards: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(deserialize_with = "one_or_many")]
    pub others: Vec<String>,
}

impl RefinedProfile {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Unknown scalar fields come back as null.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Models sometimes answer a list field with a bare string or null.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) if s.trim().is_empty() => Vec::new(),
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Null(()) => Vec::new(),
    })
}

/// First balanced `{...}` object in a model reply.
///
/// Markdown code fences are stripped first. Braces inside JSON strings are
/// ignored.
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let body = strip_code_fence(text);
    let start = body.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in body[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&body[start..=start + idx]);
                }
            }
            _ => {}
        }
    }
    None
}

fn strip_code_fence(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text;
    };
    let inner = &text[open + 3..];
    let Some(close) = inner.find("```") else {
        return text;
    };
    let inner = &inner[..close];
    inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner)
        .trim()
}

/// Parse a refiner reply into a profile.
///
/// Uses the first JSON object in the reply; callers keep the unrefined
/// knowledge base when this fails.
pub fn parse_refined_profile(text: &str) -> Result<RefinedProfile> {
    let json = extract_first_json_object(text).unwrap_or(text);
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::types::category::{CONTACT_EMAIL, DESIGNATION};

    #[test]
    fn test_prompt_lists_facts() {
        let facts = vec![
            ExtractedFact::new(DESIGNATION, "Professor", "https://a.edu"),
            ExtractedFact::new(CONTACT_EMAIL, "jane@acme.edu", "https://b.edu"),
        ];
        let prompt = format_refine_prompt(&facts);

        assert!(prompt.contains("- [Designation] Professor (source: https://a.edu)\n"));
        assert!(prompt.contains("- [Contact/Email] jane@acme.edu (source: https://b.edu)\n"));
        assert!(prompt.contains("\"contact_emails\": [string]"));
        assert!(!prompt.contains("{facts}"));
    }

    #[test]
    fn test_extract_first_json_object() {
        assert_eq!(extract_first_json_object(r#"noise {"a": {"b": 1}} {"c": 2}"#), Some(r#"{"a": {"b": 1}}"#));
        assert_eq!(
            extract_first_json_object("```json\n{\"a\": \"}\"}\n```"),
            Some("{\"a\": \"}\"}")
        );
        assert_eq!(extract_first_json_object("no json here"), None);
        assert_eq!(extract_first_json_object("{ unbalanced"), None);
    }

    #[test]
    fn test_parse_refined_profile() {
        let reply = r#"Sure! ```json
{
  "name": "Dr. Jane Doe",
  "designation": "Associate Professor",
  "contact_emails": ["jane@acme.edu"],
  "education": "PhD, MIT",
  "awards": null,
  "extra_field": 1
}
```"#;
        let profile = parse_refined_profile(reply).unwrap();

        assert_eq!(profile.name, "Dr. Jane Doe");
        assert_eq!(profile.contact_emails, vec!["jane@acme.edu"]);
        assert_eq!(profile.education, vec!["PhD, MIT"]);
        assert!(profile.awards.is_empty());
        assert_eq!(profile.university, "");
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_null_scalars_are_empty() {
        let profile = parse_refined_profile(
            r#"{"name":"Jane Doe","location":null,"designation":"Professor","department":null}"#,
        )
        .unwrap();

        assert_eq!(profile.name, "Jane Doe");
        assert_eq!(profile.designation, "Professor");
        assert_eq!(profile.location, "");
        assert_eq!(profile.department, "");
    }

    #[test]
    fn test_parse_failure_is_json_error() {
        let err = parse_refined_profile("I could not find anything.").unwrap_err();
        assert!(matches!(err, ExtractionError::JsonParse(_)));
    }
}
