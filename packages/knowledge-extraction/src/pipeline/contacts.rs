//! Contact candidate detection.
//!
//! Two passes find email and phone shaped strings:
//!
//! - the **scheme scan** looks for `mailto:` / `tel:` links in raw markup,
//! - the **token scan** inspects whitespace tokens of de-tagged text.
//!
//! Both deduplicate on the normalized `"Type: value"` key and validate every
//! candidate with [`looks_like_email`] / [`looks_like_phone`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::text::{lower, trim_contact_edges, whitespace_tokens};
use crate::types::category::{CONTACT_EMAIL, CONTACT_PHONE};

const MAILTO: &str = "mailto:";
const TEL: &str = "tel:";

/// Kind of contact detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactKind {
    Email,
    Phone,
}

impl ContactKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Phone => "Phone",
        }
    }

    /// Fact category for this kind of contact.
    pub fn category(self) -> &'static str {
        match self {
            Self::Email => CONTACT_EMAIL,
            Self::Phone => CONTACT_PHONE,
        }
    }

    fn scheme(self) -> &'static str {
        match self {
            Self::Email => MAILTO,
            Self::Phone => TEL,
        }
    }

    fn accepts(self, candidate: &str) -> bool {
        match self {
            Self::Email => looks_like_email(candidate),
            Self::Phone => looks_like_phone(candidate),
        }
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which haystack a candidate's offset refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactSource {
    /// Found by the scheme scan; offset is into the raw markup.
    Markup,
    /// Found by the token scan; offset is into the plain text.
    Text,
}

/// A validated contact string and where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCandidate {
    pub kind: ContactKind,
    pub value: String,
    pub source: ContactSource,
    /// Byte offset of the match in its haystack.
    pub offset: usize,
}

impl ContactCandidate {
    /// Deduplication key: lowercase `"Type: value"`.
    pub fn key(&self) -> String {
        lower(&format!("{}: {}", self.kind.label(), self.value))
    }
}

/// Email shape check.
///
/// Exactly one `@`, non-empty local and domain parts, a domain containing a
/// `.` that is neither its first nor last character, total length 5..=254.
pub fn looks_like_email(token: &str) -> bool {
    if !(5..=254).contains(&token.len()) {
        return false;
    }
    let mut halves = token.split('@');
    let (Some(local), Some(domain), None) = (halves.next(), halves.next(), halves.next()) else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Strict phone shape check.
///
/// Starts with `+` or a digit, contains only digits and `+ - ( )` or
/// spaces, has 7..=15 digits and at most 40 characters.
pub fn looks_like_phone(token: &str) -> bool {
    if token.is_empty() || token.len() > 40 {
        return false;
    }
    if !token.starts_with(|c: char| c == '+' || c.is_ascii_digit()) {
        return false;
    }
    let mut digits = 0;
    for c in token.chars() {
        match c {
            '0'..='9' => digits += 1,
            '+' | '-' | '(' | ')' | ' ' => {}
            _ => return false,
        }
    }
    (7..=15).contains(&digits)
}

/// Contact detector with a bounded token budget.
#[derive(Debug, Clone, Copy)]
pub struct ContactDetector {
    max_tokens: usize,
}

impl ContactDetector {
    pub fn new(max_tokens: usize) -> Self {
        Self { max_tokens }
    }

    /// Scan raw markup for `mailto:` and `tel:` links.
    pub fn scan_markup(&self, markup: &str) -> Vec<ContactCandidate> {
        let mut found = IndexMap::new();
        let haystack = lower(markup);

        for kind in [ContactKind::Email, ContactKind::Phone] {
            let scheme = kind.scheme();
            let mut from = 0;
            while let Some(rel) = haystack[from..].find(scheme) {
                let at = from + rel;
                let start = at + scheme.len();
                let len = markup[start..]
                    .find(|c: char| c == '"' || c == '\'' || c == '>' || c.is_whitespace())
                    .unwrap_or(markup.len() - start);
                from = start + len;

                let mut raw = &markup[start..start + len];
                if kind == ContactKind::Email {
                    // drop ?subject=... query parameters
                    raw = raw.split('?').next().unwrap_or_default();
                }
                let value = trim_contact_edges(raw);
                if kind.accepts(value) {
                    insert(
                        &mut found,
                        ContactCandidate {
                            kind,
                            value: value.to_string(),
                            source: ContactSource::Markup,
                            offset: at,
                        },
                    );
                }
            }
        }

        found.into_values().collect()
    }

    /// Scan de-tagged text token by token.
    pub fn scan_text(&self, text: &str) -> Vec<ContactCandidate> {
        let mut found = IndexMap::new();

        for (offset, token) in whitespace_tokens(text).take(self.max_tokens) {
            if let Some(candidate) = classify_token(token) {
                let (kind, value) = candidate;
                insert(
                    &mut found,
                    ContactCandidate {
                        kind,
                        value: value.to_string(),
                        source: ContactSource::Text,
                        offset,
                    },
                );
            }
        }

        found.into_values().collect()
    }

    /// Run both passes and merge them, first occurrence winning.
    pub fn detect(&self, markup: &str, text: &str) -> Vec<ContactCandidate> {
        let mut found = IndexMap::new();
        for candidate in self.scan_markup(markup).into_iter().chain(self.scan_text(text)) {
            insert(&mut found, candidate);
        }
        found.into_values().collect()
    }
}

impl Default for ContactDetector {
    fn default() -> Self {
        Self::new(2_000)
    }
}

fn insert(found: &mut IndexMap<String, ContactCandidate>, candidate: ContactCandidate) {
    found.entry(candidate.key()).or_insert(candidate);
}

/// Classify a single whitespace token.
fn classify_token(token: &str) -> Option<(ContactKind, &str)> {
    let trimmed = trim_contact_edges(token);
    let lowered = lower(trimmed);

    for kind in [ContactKind::Email, ContactKind::Phone] {
        if lowered.starts_with(kind.scheme()) {
            let value = trim_contact_edges(&trimmed[kind.scheme().len()..]);
            return kind.accepts(value).then_some((kind, value));
        }
    }

    if trimmed.contains('@') {
        return looks_like_email(trimmed).then_some((ContactKind::Email, trimmed));
    }
    looks_like_phone(trimmed).then_some((ContactKind::Phone, trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validator() {
        assert!(looks_like_email("a@b.co"));
        assert!(looks_like_email("jane.doe@acme.edu"));

        assert!(!looks_like_email("a@@b.co"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("a@.bco"));
        assert!(!looks_like_email("a@bco."));
        assert!(!looks_like_email("a@b.c@d.e"));

        let long = format!("{}@example.com", "x".repeat(255 - 12));
        assert_eq!(long.len(), 255);
        assert!(!looks_like_email(&long));
    }

    #[test]
    fn test_phone_validator() {
        assert!(!looks_like_phone("123456"));
        assert!(looks_like_phone("1234567"));
        assert!(looks_like_phone("123456789012345"));
        assert!(!looks_like_phone("1234567890123456"));
        assert!(!looks_like_phone("12345a7"));

        assert!(looks_like_phone("+92-21-111-222-333"));
        assert!(looks_like_phone("555 123-4567"));
        assert!(!looks_like_phone("+"));
        assert!(!looks_like_phone("v1.2.3.4567"));
        assert!(!looks_like_phone(&"1-".repeat(21)));
    }

    #[test]
    fn test_scheme_scan_finds_links_with_offsets() {
        let html = r#"<p>Mail <a href="MAILTO:Jane.Doe@acme.edu?subject=Hi">me</a>
            or call <a href='tel:+1-555-123-4567'>here</a>.
            Again: <a href="mailto:jane.doe@acme.edu">dup</a></p>"#;

        let found = ContactDetector::default().scan_markup(html);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, ContactKind::Email);
        assert_eq!(found[0].value, "Jane.Doe@acme.edu");
        assert_eq!(found[0].offset, html.find("MAILTO:").unwrap());
        assert_eq!(found[0].source, ContactSource::Markup);
        assert_eq!(found[1].kind, ContactKind::Phone);
        assert_eq!(found[1].value, "+1-555-123-4567");
    }

    #[test]
    fn test_scheme_scan_rejects_invalid_values() {
        let html = r#"<a href="mailto:">x</a><a href="tel:call-us">y</a>"#;
        assert!(ContactDetector::default().scan_markup(html).is_empty());
    }

    #[test]
    fn test_token_scan() {
        let text = "Contact: (jane.doe@acme.edu), office +92-21-5555555; version 1.2.3 id 12345 mailto:x@y.io";
        let found = ContactDetector::default().scan_text(text);
        let values: Vec<_> = found.iter().map(|c| c.value.as_str()).collect();

        assert_eq!(values, vec!["jane.doe@acme.edu", "+92-21-5555555", "x@y.io"]);
        assert_eq!(found[0].offset, text.find("(jane").unwrap());
        assert!(found.iter().all(|c| c.source == ContactSource::Text));
    }

    #[test]
    fn test_token_budget() {
        let text = format!("{} 5551234567", "word ".repeat(10));
        assert!(ContactDetector::new(10).scan_text(&text).is_empty());
        assert_eq!(ContactDetector::new(11).scan_text(&text).len(), 1);

        // punctuation-only tokens spend the budget too
        let text = format!("{} 5551234567", "- ".repeat(10));
        assert!(ContactDetector::new(10).scan_text(&text).is_empty());
        assert_eq!(ContactDetector::new(11).scan_text(&text).len(), 1);
    }

    #[test]
    fn test_detect_dedupes_across_passes() {
        let html = r#"<a href="mailto:a@b.co">a@b.co</a>"#;
        let found = ContactDetector::default().detect(html, "write to A@B.co today");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source, ContactSource::Markup);
        assert_eq!(found[0].key(), "email: a@b.co");
    }
}
