//! Regex-based HTML to text conversion.

use lazy_static::lazy_static;
use regex::Regex;

use super::TextConverter;

/// Elements whose whole content is boilerplate.
const SKIPPED_ELEMENTS: &[&str] = &[
    "head", "script", "style", "noscript", "nav", "header", "footer", "aside", "button", "form",
];

lazy_static! {
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();

    // the regex crate has no backreferences: one pattern per element
    static ref SKIPPED: Vec<Regex> = SKIPPED_ELEMENTS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).unwrap())
        .collect();

    static ref LINE_BREAK: Regex = Regex::new(
        r"(?i)<br\s*/?>|</(?:p|div|li|h[1-6]|tr|td|th|section|article|ul|ol|table|blockquote|pre|dd|dt)\s*>"
    ).unwrap();

    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref HORIZONTAL_SPACE: Regex = Regex::new(r"[ \t\r\x0B\x0C\x{A0}]+").unwrap();
}

/// Converts HTML into newline-separated text runs.
///
/// Boilerplate elements are dropped, block ends become line breaks, common
/// entities are decoded, and runs of two characters or fewer are discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTextConverter;

impl HtmlTextConverter {
    pub fn new() -> Self {
        Self
    }
}

impl TextConverter for HtmlTextConverter {
    fn convert(&self, markup: &str) -> String {
        let mut text = COMMENT.replace_all(markup, "").into_owned();
        for pattern in SKIPPED.iter() {
            text = pattern.replace_all(&text, " ").into_owned();
        }
        let text = LINE_BREAK.replace_all(&text, "\n");
        let text = TAG.replace_all(&text, " ");
        let text = decode_entities(&text);

        text.lines()
            .map(|line| HORIZONTAL_SPACE.replace_all(line, " "))
            .map(|line| line.trim().to_string())
            .filter(|line| line.chars().count() > 2)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&#64;", "@")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boilerplate_is_removed() {
        let html = r#"<html><head><title>T</title><style>p { color: red }</style></head>
            <body>
              <nav><a href="/">Home</a> | <a href="/people">People</a></nav>
              <script>var email = "bot@spam.com";</script>
              <h1>Jane Doe</h1>
              <p>Professor of Physics<br>Acme University</p>
              <form><button>Search</button></form>
              <footer>All rights reserved</footer>
            </body></html>"#;

        let text = HtmlTextConverter::new().convert(html);

        assert_eq!(text, "Jane Doe\nProfessor of Physics\nAcme University");
    }

    #[test]
    fn test_entities_and_short_runs() {
        let html = "<div>Email: jane&#64;acme.edu &amp; more</div><div>ok</div><span>x</span>";
        let text = HtmlTextConverter::new().convert(html);
        assert_eq!(text, "Email: jane@acme.edu & more");
    }

    #[test]
    fn test_attributes_do_not_leak() {
        let html = r#"<p class="bio" data-x="y">Jane   Doe <em>teaches</em></p>"#;
        assert_eq!(HtmlTextConverter::new().convert(html), "Jane Doe teaches");
    }
}
