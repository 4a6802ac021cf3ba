//! Placeholder parser for `{{NAME}}` syntax
//!
//! Parses strings to extract placeholder references with their positions.

use std::ops::Range;

/// A parsed placeholder reference in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// The placeholder name (without `{{ }}`), trimmed.
    pub name: String,

    /// Byte range in the original string where this reference appears.
    pub span: Range<usize>,
}

impl Placeholder {
    /// Creates a new placeholder reference.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Parses a string and extracts all placeholder references.
///
/// # Examples
///
/// ```
/// use servertester_application::placeholder::parse_placeholders;
///
/// let refs = parse_placeholders("GET {{PATH}} HTTP/1.1");
/// assert_eq!(refs.len(), 1);
/// assert_eq!(refs[0].name, "PATH");
/// assert_eq!(refs[0].span, 4..12);
/// ```
#[must_use]
pub fn parse_placeholders(input: &str) -> Vec<Placeholder> {
    let mut references = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        if ch != '{' || !matches!(chars.peek(), Some((_, '{'))) {
            continue;
        }
        chars.next(); // second {
        let start = i;
        let mut name = String::new();
        let mut found_end = false;

        while let Some((_, ch)) = chars.next() {
            if ch == '}' {
                if let Some(&(end_idx, '}')) = chars.peek() {
                    chars.next();
                    let trimmed = name.trim();
                    if !trimmed.is_empty() {
                        references.push(Placeholder::new(trimmed, start..end_idx + 1));
                    }
                    found_end = true;
                    break;
                }
            }
            name.push(ch);
        }

        // Unclosed reference: nothing after it can be a placeholder either.
        if !found_end {
            break;
        }
    }

    references
}
