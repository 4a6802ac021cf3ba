//! Request template type

use serde::{Deserialize, Serialize};

use super::{Header, Headers, HttpMethod};
use crate::error::{DomainError, DomainResult};

/// A reusable default request shape.
///
/// Templates are loaded once and shared read-only between every test case
/// that references them; per-test customization goes through
/// [`RequestOverride`](super::RequestOverride).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTemplate {
    id: String,
    method: HttpMethod,
    path: String,
    #[serde(default)]
    headers: Headers,
    #[serde(default)]
    body: String,
}

impl RequestTemplate {
    /// Creates a `GET /` template with no headers and an empty body.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty.
    pub fn new(id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidIdentifier(id));
        }
        Ok(Self {
            id,
            method: HttpMethod::Get,
            path: "/".to_string(),
            headers: Headers::new(),
            body: String::new(),
        })
    }

    /// Sets the default method.
    #[must_use]
    pub const fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the default path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Appends a default header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(Header::new(name, value));
        self
    }

    /// Sets the default body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Template identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Default method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Default request target.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Default headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Default body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}
