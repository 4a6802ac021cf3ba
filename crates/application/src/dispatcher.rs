//! Request dispatcher.
//!
//! Materializes the request for a [`TestCase`], sends it exactly once and
//! returns what came back as a [`ResponseCapture`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use servertester_domain::{
    RequestOverride, RequestSpec, RequestTemplate, ResponseCapture, RunSettings,
};
use url::Url;

use crate::error::ApplicationResult;
use crate::placeholder::substitute;
use crate::ports::{HttpClient, OutboundRequest};
use crate::registry::TestCase;

/// Merges an override onto a template without touching either.
///
/// Override fields win; unset ones fall back to the template. Placeholders
/// are left alone, so an empty override yields the template unchanged.
#[must_use]
pub fn merge(template: &RequestTemplate, overrides: &RequestOverride) -> RequestSpec {
    let mut request = RequestSpec::from(template);
    if let Some(method) = overrides.method {
        request.method = method;
    }
    if let Some(path) = &overrides.path {
        request.path.clone_from(path);
    }
    if let Some(user_agent) = &overrides.user_agent {
        request.headers.set("User-Agent", user_agent.clone());
    }
    for header in overrides.headers.iter() {
        request.headers.set(header.name.clone(), header.value.clone());
    }
    if let Some(body) = &overrides.body {
        request.body.clone_from(body);
    }
    request
}

/// Sends one request per test case.
pub struct Dispatcher<C: HttpClient> {
    client: Arc<C>,
    base_url: Url,
    variables: BTreeMap<String, String>,
    timeout: Duration,
}

impl<C: HttpClient> Dispatcher<C> {
    /// Creates a dispatcher for the server described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings do not form a valid base URL.
    pub fn new(client: Arc<C>, settings: &RunSettings) -> ApplicationResult<Self> {
        Ok(Self {
            client,
            base_url: settings.base_url()?,
            variables: settings.template_variables(),
            timeout: Duration::from_millis(settings.timeout_ms),
        })
    }

    /// Client requests go through.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the final request for a test case.
    ///
    /// Placeholder values come from the run settings, overlaid with the
    /// override's parameters. Unknown placeholders stay literal.
    #[must_use]
    pub fn materialize(&self, case: &TestCase) -> RequestSpec {
        let mut request = merge(case.template(), case.overrides());

        let mut vars = self.variables.clone();
        vars.extend(case.overrides().params.clone());

        let mut unresolved = Vec::new();
        let mut fill = |text: &str| {
            let result = substitute(text, &vars);
            unresolved.extend(result.unresolved);
            result.text
        };
        request.path = fill(&request.path);
        request.body = fill(&request.body);
        request.headers = request
            .headers
            .iter()
            .map(|h| (h.name.clone(), fill(&h.value)))
            .collect();

        if !unresolved.is_empty() {
            tracing::warn!(
                test = case.name(),
                placeholders = ?unresolved,
                "unresolved placeholders left in request"
            );
        }
        request
    }

    /// URL a request is sent to.
    ///
    /// The target only ever replaces the path and query of the base URL, so
    /// a target such as `//other.host/x` stays on the configured server.
    #[must_use]
    pub fn url_for(&self, request: &RequestSpec) -> Url {
        let target = request.target();
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target.as_str(), None),
        };
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.set_query(query);
        url
    }

    /// Sends the test case's request and captures the outcome.
    ///
    /// A failure to obtain any response is returned as a capture with its
    /// transport error set, never retried.
    pub async fn execute(&self, case: &TestCase) -> ResponseCapture {
        let spec = self.materialize(case);
        let start = Instant::now();
        let url = self.url_for(&spec);

        tracing::debug!(test = case.name(), method = %spec.method, %url, "dispatching request");

        let request = OutboundRequest {
            url,
            spec,
            timeout: self.timeout,
        };
        match self.client.execute(&request).await {
            Ok(capture) => {
                tracing::debug!(test = case.name(), status = ?capture.status, "response captured");
                capture
            }
            Err(e) => {
                tracing::warn!(test = case.name(), error = %e, "transport failure");
                ResponseCapture::failed(e.to_transport_error(), start.elapsed())
            }
        }
    }
}
