//! Page text preparation ahead of fact extraction.

use crate::pipeline::relevance::RelevanceScorer;
use crate::text::lower;

pub use crate::text::truncate_chars;

/// Paragraphs longer than this are split when focusing context.
const MAX_PARAGRAPH_CHARS: usize = 500;

/// Site boilerplate removed before extraction (lowercase).
const NOISE_PHRASES: &[&str] = &[
    "skip to main content",
    "back to faculty profiles",
    "return to faculty profiles",
    "faculty profiles",
    "home page",
    "site navigation",
    "privacy policy",
    "terms of use",
    "all rights reserved",
    "cookie policy",
    "university sitemap",
    "search this site",
    "content may not be reproduced",
];

/// Crude de-tagger used when proper markup conversion is unavailable.
///
/// Drops everything between `<` and `>` and maps line breaks and tabs to
/// spaces.
pub fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            '\n' | '\r' | '\t' if !in_tag => out.push(' '),
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Keep only the paragraphs that clearly mention the identity.
///
/// A paragraph ends at a newline or after 500 characters. Paragraphs scoring
/// at least `strong_relevance` are kept and joined with spaces. Returns the
/// input unchanged for an empty identity or when nothing qualifies.
pub fn focus_target_context(text: &str, scorer: &RelevanceScorer<'_>, strong_relevance: u32) -> String {
    if text.is_empty() || scorer.identity().is_empty() {
        return text.to_string();
    }

    let mut focused = String::new();
    for paragraph in paragraphs(text) {
        let score = scorer.score(paragraph);
        if score >= strong_relevance && scorer.accepts(score) {
            focused.push_str(paragraph);
            focused.push(' ');
        }
    }

    if focused.is_empty() {
        text.to_string()
    } else {
        focused
    }
}

fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let mut end = rest.len();
        for (count, (idx, c)) in rest.char_indices().enumerate() {
            if c == '\n' || count + 1 >= MAX_PARAGRAPH_CHARS {
                end = idx + c.len_utf8();
                break;
            }
        }
        let (head, tail) = rest.split_at(end);
        rest = tail;
        Some(head)
    })
}

/// Remove fixed boilerplate phrases, case-insensitively.
pub fn remove_noise_phrases(text: &str) -> String {
    let mut out = text.to_string();
    let mut low = lower(text);

    for phrase in NOISE_PHRASES {
        while let Some(at) = low.find(phrase) {
            let range = at..at + phrase.len();
            out.replace_range(range.clone(), "");
            low.replace_range(range, "");
        }
    }
    out
}

/// Case-insensitive check for any of `keywords` in `text`.
pub fn contains_any_keyword(text: &str, keywords: &[String]) -> bool {
    let low = lower(text);
    keywords
        .iter()
        .any(|k| !k.is_empty() && low.contains(&lower(k)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExtractionConfig, Identity};

    #[test]
    fn test_strip_tags() {
        let html = "<p>Hello\n<b>World</b></p>\t<br/>x";
        assert_eq!(strip_tags(html), "Hello World x");
        assert_eq!(strip_tags(""), "");
    }

    #[test]
    fn test_remove_noise_phrases() {
        let text = "Skip to Main Content Jane Doe. Privacy Policy | ALL RIGHTS RESERVED";
        assert_eq!(remove_noise_phrases(text), " Jane Doe.  | ");
    }

    #[test]
    fn test_contains_any_keyword() {
        let keywords = vec!["email".to_string(), "@".to_string()];
        assert!(contains_any_keyword("Send an EMAIL", &keywords));
        assert!(contains_any_keyword("a@b", &keywords));
        assert!(!contains_any_keyword("nothing here", &keywords));
    }

    #[test]
    fn test_focus_keeps_relevant_paragraphs() {
        let id = Identity::new("Jane Doe", "Acme University", "");
        let config = ExtractionConfig::default();
        let scorer = RelevanceScorer::new(&id, &config);

        let text = "Campus news\nJane Doe joined Acme University\nParking info\n";
        assert_eq!(
            focus_target_context(text, &scorer, 15),
            "Jane Doe joined Acme University\n "
        );
    }

    #[test]
    fn test_focus_falls_back_to_input() {
        let config = ExtractionConfig::default();

        let id = Identity::named("Jane Doe");
        let scorer = RelevanceScorer::new(&id, &config);
        assert_eq!(focus_target_context("nothing\nrelevant", &scorer, 15), "nothing\nrelevant");

        let empty = Identity::empty();
        let scorer = RelevanceScorer::new(&empty, &config);
        assert_eq!(focus_target_context("a\nb", &scorer, 15), "a\nb");
    }

    #[test]
    fn test_long_paragraphs_are_split() {
        let text = "y".repeat(1200);
        let parts: Vec<_> = paragraphs(&text).collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 500);
    }
}
