//! Text segmenter: splits page text into bounded candidate lines.

/// Characters that end a segment (the delimiter stays in the segment).
const DELIMITERS: &[char] = &['.', '?', '!', '\n', ';'];

/// Iterator over the trimmed, non-empty segments of a text blob.
///
/// A segment ends after a sentence-like delimiter, or once the running
/// fragment reaches `max_chars` characters.
///
/// ```rust
/// use knowledge_extraction::pipeline::Segmenter;
///
/// let lines: Vec<_> = Segmenter::new("One. Two?\n\n  Three", 1000).collect();
/// assert_eq!(lines, vec!["One.", "Two?", "Three"]);
/// ```
#[derive(Debug, Clone)]
pub struct Segmenter<'a> {
    text: &'a str,
    pos: usize,
    max_chars: usize,
}

impl<'a> Segmenter<'a> {
    pub fn new(text: &'a str, max_chars: usize) -> Self {
        Self {
            text,
            pos: 0,
            max_chars: max_chars.max(1),
        }
    }

    /// Byte index just past the end of the next raw fragment.
    fn next_boundary(&self) -> usize {
        let rest = &self.text[self.pos..];
        for (count, (idx, c)) in rest.char_indices().enumerate() {
            let end = idx + c.len_utf8();
            if DELIMITERS.contains(&c) || count + 1 >= self.max_chars {
                return self.pos + end;
            }
        }
        self.text.len()
    }
}

impl<'a> Iterator for Segmenter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.text.len() {
            let end = self.next_boundary();
            let segment = self.text[self.pos..end].trim();
            self.pos = end;
            if !segment.is_empty() {
                return Some(segment);
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Segmenter<'_> {}

/// Split `text` into segments with the given safety length.
pub fn segment(text: &str, max_chars: usize) -> Vec<&str> {
    Segmenter::new(text, max_chars).collect()
}
