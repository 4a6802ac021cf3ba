//! Request specification type

use serde::{Deserialize, Serialize};

use super::{Headers, HttpMethod, RequestTemplate};

/// A fully materialized request, ready to send.
///
/// Produced by merging a [`RequestOverride`](super::RequestOverride) onto a
/// [`RequestTemplate`]; nothing in it refers back to placeholders the
/// dispatcher could still resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// Request target (path and query)
    pub path: String,
    /// HTTP headers, in send order
    #[serde(default)]
    pub headers: Headers,
    /// Request body
    #[serde(default)]
    pub body: String,
}

impl RequestSpec {
    /// Creates a `GET` request for the given path.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            headers: Headers::new(),
            body: String::new(),
        }
    }

    /// Returns the request target, forcing a leading slash.
    #[must_use]
    pub fn target(&self) -> String {
        if self.path.starts_with('/') || self.path == "*" {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        }
    }
}

impl From<&RequestTemplate> for RequestSpec {
    fn from(template: &RequestTemplate) -> Self {
        Self {
            method: template.method(),
            path: template.path().to_string(),
            headers: template.headers().clone(),
            body: template.body().to_string(),
        }
    }
}
