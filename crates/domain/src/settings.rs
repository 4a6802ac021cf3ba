//! Run Settings Domain Model
//!
//! Defines where a suite is sent and how it is executed.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Transport scheme of the server under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP (default).
    #[default]
    Http,
    /// HTTP over TLS.
    Https,
}

impl Scheme {
    /// Returns the scheme as it appears in a URL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// Settings for one run of a suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Scheme used to reach the server.
    #[serde(default)]
    pub scheme: Scheme,

    /// Host name or address of the server under test.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port of the server under test.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Number of test cases allowed in flight at once. `1` runs sequentially.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Directory of `.http` template files, loaded on top of the built-ins.
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Extra placeholder values available to every template.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

const fn default_port() -> u16 {
    80
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_concurrency() -> usize {
    1
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            scheme: Scheme::default(),
            host: default_host(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            concurrency: default_concurrency(),
            template_dir: None,
            variables: BTreeMap::new(),
        }
    }
}

impl RunSettings {
    /// Returns the base URL requests are resolved against.
    ///
    /// # Errors
    ///
    /// Returns an error if host and port do not form a valid URL.
    pub fn base_url(&self) -> DomainResult<Url> {
        let raw = format!("{}://{}:{}/", self.scheme.as_str(), self.host, self.port);
        Url::parse(&raw).map_err(|e| DomainError::InvalidUrl(format!("{e}: {raw}")))
    }

    /// Value for the `Host` header: the port is omitted when it is the scheme default.
    #[must_use]
    pub fn host_header(&self) -> String {
        match (self.scheme, self.port) {
            (Scheme::Http, 80) | (Scheme::Https, 443) => self.host.clone(),
            _ => format!("{}:{}", self.host, self.port),
        }
    }

    /// Placeholder values every template can use.
    ///
    /// `HOST`, `PORT` and `SCHEME` are always present; entries from
    /// `variables` are layered on top.
    #[must_use]
    pub fn template_variables(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::from([
            ("HOST".to_string(), self.host_header()),
            ("PORT".to_string(), self.port.to_string()),
            ("SCHEME".to_string(), self.scheme.as_str().to_string()),
        ]);
        vars.extend(self.variables.clone());
        vars
    }

    /// Effective concurrency, never below one.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}
