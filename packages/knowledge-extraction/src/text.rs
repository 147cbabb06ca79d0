//! Small string helpers shared by the engine.
//!
//! Case folding keeps every character's UTF-8 length, so byte offsets
//! computed on a lowered copy are valid in the original string.

/// Lowercase copy of `s` with byte offsets preserved.
///
/// Characters whose lowercase form has a different encoded length (`İ`, `ẞ`)
/// are kept as they are.
pub fn lower(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    let mut folded = c.to_lowercase();
    match (folded.next(), folded.next()) {
        (Some(l), None) if l.len_utf8() == c.len_utf8() => l,
        _ => c,
    }
}

/// Strip ASCII punctuation from both ends of `s`.
pub fn trim_punct_edges(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_punctuation())
}

/// Strip edge punctuation from a contact token, keeping a leading `+`
/// that introduces a number (`+92-21-...`).
pub fn trim_contact_edges(s: &str) -> &str {
    let trimmed = trim_punct_edges(s);
    if trimmed.is_empty() {
        return trimmed;
    }
    let start = trimmed.as_ptr() as usize - s.as_ptr() as usize;
    if start > 0 && s[..start].ends_with('+') && trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        return &s[start - 1..start + trimmed.len()];
    }
    trimmed
}

/// Lowercased whitespace-separated words of `s`, edge punctuation removed,
/// keeping only words of at least `min_len` characters.
pub fn word_parts(s: &str, min_len: usize) -> Vec<String> {
    s.split_whitespace()
        .map(|w| lower(trim_punct_edges(w)))
        .filter(|w| w.chars().count() >= min_len)
        .collect()
}

/// Whitespace-separated tokens of `text` with their byte offsets.
pub fn whitespace_tokens(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut rest = 0;
    std::iter::from_fn(move || {
        let tail = &text[rest..];
        let start = rest + tail.find(|c: char| !c.is_whitespace())?;
        let len = text[start..]
            .find(char::is_whitespace)
            .unwrap_or(text.len() - start);
        rest = start + len;
        Some((start, &text[start..start + len]))
    })
}

/// Slice of `text` spanning `radius` bytes either side of `center`,
/// widened to the nearest char boundaries.
pub fn window(text: &str, center: usize, radius: usize) -> &str {
    let mut start = center.saturating_sub(radius).min(text.len());
    let mut end = center.saturating_add(radius).min(text.len());
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    while !text.is_char_boundary(end) {
        end += 1;
    }
    &text[start..end]
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
