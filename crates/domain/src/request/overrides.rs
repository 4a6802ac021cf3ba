//! Per-test request overrides

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Headers, HttpMethod};
use crate::error::DomainResult;

/// Placeholder name that overrides the request target.
pub const PATH_KEY: &str = "PATH";
/// Placeholder name that overrides the `User-Agent` header.
pub const USER_AGENT_KEY: &str = "USERAGENT";
/// Placeholder name that overrides the method.
pub const METHOD_KEY: &str = "METHOD";
/// Placeholder name that overrides the body.
pub const BODY_KEY: &str = "BODY";

/// Customization of a [`RequestTemplate`](super::RequestTemplate) for one test case.
///
/// Every field is optional; unset fields fall back to the template. `params`
/// holds values for `{{NAME}}` placeholders in the template text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOverride {
    /// Replacement method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    /// Replacement request target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Replacement `User-Agent` value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Headers that replace same-named template headers (or are appended).
    #[serde(default, skip_serializing_if = "Headers::is_empty")]
    pub headers: Headers,
    /// Replacement body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Placeholder substitutions.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl RequestOverride {
    /// Creates an empty override.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an override from `NAME=value` pairs.
    ///
    /// `PATH`, `USERAGENT` and `BODY` set the matching field, `METHOD` sets
    /// the method when it parses (see [`validate`](Self::validate)). Every
    /// entry is also kept as a placeholder parameter, so a template may
    /// still reference `{{PATH}}` directly.
    #[must_use]
    pub fn from_params<K, V, I>(params: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        params
            .into_iter()
            .fold(Self::new(), |acc, (key, value)| acc.param(key, value))
    }

    /// Sets the request target.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the method.
    #[must_use]
    pub const fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets a header, replacing any template header of the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds one `NAME=value` entry, routing well-known names to their field.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match key.as_str() {
            PATH_KEY => self.path = Some(value.clone()),
            USER_AGENT_KEY => self.user_agent = Some(value.clone()),
            BODY_KEY => self.body = Some(value.clone()),
            // an unparsable method keeps the previous one; `validate` reports it
            METHOD_KEY => {
                if let Ok(method) = value.parse() {
                    self.method = Some(method);
                }
            }
            _ => {}
        }
        self.params.insert(key, value);
        self
    }

    /// Checks entries that could not be applied when they were added.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedMethod` if the `METHOD` parameter is not a known
    /// HTTP method.
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(raw) = self.params.get(METHOD_KEY) {
            raw.parse::<HttpMethod>()?;
        }
        Ok(())
    }

    /// Returns true if nothing is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
