//! Placeholder substitution engine

use std::collections::BTreeMap;

use super::parser::parse_placeholders;

/// Result of substituting placeholders in one string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// The text with every known placeholder replaced.
    pub text: String,

    /// Placeholder names that had no value; they stay literal in `text`.
    pub unresolved: Vec<String>,
}

impl Substitution {
    /// Whether every placeholder was replaced.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Replaces `{{NAME}}` references with values from `vars`.
///
/// Values are inserted verbatim and never re-scanned, so a value that itself
/// contains `{{...}}` is not expanded further.
#[must_use]
pub fn substitute(input: &str, vars: &BTreeMap<String, String>) -> Substitution {
    let references = parse_placeholders(input);
    if references.is_empty() {
        return Substitution {
            text: input.to_string(),
            unresolved: Vec::new(),
        };
    }

    let mut text = String::with_capacity(input.len());
    let mut unresolved = Vec::new();
    let mut last_end = 0;

    for reference in &references {
        text.push_str(&input[last_end..reference.span.start]);
        match vars.get(&reference.name) {
            Some(value) => text.push_str(value),
            None => {
                text.push_str(&input[reference.span.clone()]);
                unresolved.push(reference.name.clone());
            }
        }
        last_end = reference.span.end;
    }
    text.push_str(&input[last_end..]);

    Substitution { text, unresolved }
}
