//! HTTP Header types

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A single HTTP header with name and value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The header name as written (e.g., "User-Agent")
    pub name: String,
    /// The header value
    pub value: String,
}

impl Header {
    /// Creates a new header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parses a `Name: value` header line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line has no colon or an empty name.
    pub fn parse_line(line: &str) -> DomainResult<Self> {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| DomainError::InvalidHeaderName(line.to_string()))?;
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(DomainError::InvalidHeaderName(line.to_string()));
        }
        Ok(Self::new(name, value.trim()))
    }

    /// Returns true if this header has the given name, ignoring ASCII case.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// An ordered collection of HTTP headers.
///
/// Lookups are case-insensitive on the name. Repeated names are kept, so
/// a response with several `WWW-Authenticate` lines keeps all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    items: Vec<Header>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends a header, keeping any existing header with the same name.
    pub fn add(&mut self, header: Header) {
        self.items.push(header);
    }

    /// Replaces every header with this name by a single new one.
    ///
    /// The replacement takes the position of the first removed header, or
    /// goes last when the name was not present.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let header = Header::new(name, value);
        match self.items.iter().position(|h| h.is_named(&header.name)) {
            Some(first) => {
                self.items[first] = header;
                let name = self.items[first].name.clone();
                let mut index = 0;
                self.items.retain(|h| {
                    let keep = index <= first || !h.is_named(&name);
                    index += 1;
                    keep
                });
            }
            None => self.items.push(header),
        }
    }

    /// Returns the first value for a header name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|h| h.is_named(name))
            .map(|h| h.value.as_str())
    }

    /// Returns every value for a header name, in received order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.items
            .iter()
            .filter(move |h| h.is_named(name))
            .map(|h| h.value.as_str())
    }

    /// Returns true if a header with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|h| h.is_named(name))
    }

    /// Iterates over all headers in order.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.items.iter()
    }

    /// Returns all headers as a slice.
    #[must_use]
    pub fn all(&self) -> &[Header] {
        &self.items
    }

    /// Returns the number of headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len is not const in stable
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty is not const in stable
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<T: IntoIterator<Item = Header>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        iter.into_iter().map(|(n, v)| Header::new(n, v)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_line() {
        let header = Header::parse_line("User-Agent:  Checker ").unwrap();
        assert_eq!(header, Header::new("User-Agent", "Checker"));

        let header = Header::parse_line(r#"WWW-Authenticate: Basic realm="a:b""#).unwrap();
        assert_eq!(header.value, r#"Basic realm="a:b""#);

        assert!(Header::parse_line("no colon here").is_err());
        assert!(Header::parse_line(": empty").is_err());
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let headers: Headers = [("WWW-Authenticate", "Basic")].into_iter().collect();
        assert_eq!(headers.get("www-authenticate"), Some("Basic"));
        assert_eq!(headers.get("WWW-AUTHENTICATE"), Some("Basic"));
        assert_eq!(headers.get("Authorization"), None);
    }

    #[test]
    fn test_multi_value_access() {
        let headers: Headers = [
            ("WWW-Authenticate", "Digest realm=\"x\""),
            ("Content-Type", "text/plain"),
            ("www-authenticate", "Basic realm=\"x\""),
        ]
        .into_iter()
        .collect();

        assert_eq!(headers.get("WWW-Authenticate"), Some("Digest realm=\"x\""));
        let all: Vec<_> = headers.get_all("WWW-Authenticate").collect();
        assert_eq!(all, vec!["Digest realm=\"x\"", "Basic realm=\"x\""]);
    }

    #[test]
    fn test_set_replaces_all_occurrences_in_place() {
        let mut headers: Headers = [
            ("Host", "localhost"),
            ("User-Agent", "a"),
            ("Accept", "*/*"),
            ("user-agent", "b"),
        ]
        .into_iter()
        .collect();

        headers.set("User-Agent", "Checker");

        let names: Vec<_> = headers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Host", "User-Agent", "Accept"]);
        assert_eq!(headers.get("user-agent"), Some("Checker"));
    }

    #[test]
    fn test_set_appends_new_name() {
        let mut headers = Headers::new();
        headers.set("Connection", "close");
        assert_eq!(headers.len(), 1);
        assert!(headers.contains("connection"));
    }
}
