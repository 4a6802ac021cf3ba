//! Test registry.
//!
//! A suite declares [`TestBinding`]s: a name, a template identifier, an
//! override and a check body. Registering a binding resolves its template and
//! turns it into an immutable [`TestCase`]; registration order is run order.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use servertester_domain::{RequestOverride, RequestTemplate};

use crate::checks::{BodyResult, Checks};
use crate::error::{ApplicationError, ApplicationResult};
use crate::template_store::TemplateStore;

type BodyFn = dyn Fn(&mut Checks<'_>) -> BodyResult + Send + Sync;

/// The executable part of a test: checks run against the captured response.
#[derive(Clone)]
pub struct TestBody(Arc<BodyFn>);

impl TestBody {
    /// Wraps a closure or function as a test body.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&mut Checks<'_>) -> BodyResult + Send + Sync + 'static,
    {
        Self(Arc::new(body))
    }

    /// Runs the body against a recorder.
    ///
    /// # Errors
    ///
    /// Returns whatever the body returns.
    pub fn call(&self, checks: &mut Checks<'_>) -> BodyResult {
        (self.0)(checks)
    }
}

impl fmt::Debug for TestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TestBody(..)")
    }
}

/// A declared test: what to send and what to check, not yet resolved.
#[derive(Debug, Clone)]
pub struct TestBinding {
    /// Test name, unique within a suite.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Identifier of the request template.
    pub template_id: String,
    /// Customization applied on top of the template.
    pub overrides: RequestOverride,
    /// Checks to run against the response.
    pub body: TestBody,
    /// Set for tests that are declared but not written yet.
    pub pending: Option<String>,
}

impl TestBinding {
    /// Creates a binding with an empty override and a body that checks nothing.
    #[must_use]
    pub fn new(name: impl Into<String>, template_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            template_id: template_id.into(),
            overrides: RequestOverride::new(),
            body: TestBody::new(|_| Ok(())),
            pending: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replaces the override.
    #[must_use]
    pub fn with_override(mut self, overrides: RequestOverride) -> Self {
        self.overrides = overrides;
        self
    }

    /// Adds one `NAME=value` override entry.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides = self.overrides.param(key, value);
        self
    }

    /// Marks the test as not implemented yet.
    ///
    /// A pending test sends no request and is reported as
    /// `not_implemented` with `reason`, whether or not the server is up.
    #[must_use]
    pub fn pending(mut self, reason: impl Into<String>) -> Self {
        self.pending = Some(reason.into());
        self
    }

    /// Sets the check body.
    #[must_use]
    pub fn check<F>(mut self, body: F) -> Self
    where
        F: Fn(&mut Checks<'_>) -> BodyResult + Send + Sync + 'static,
    {
        self.body = TestBody::new(body);
        self
    }
}

/// A registered test: binding plus its resolved template.
#[derive(Debug, Clone)]
pub struct TestCase {
    index: usize,
    name: String,
    description: String,
    template: Arc<RequestTemplate>,
    overrides: RequestOverride,
    body: TestBody,
    pending: Option<String>,
}

impl TestCase {
    /// Position in registration order.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Test name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Shared template this test is based on.
    #[must_use]
    pub fn template(&self) -> &RequestTemplate {
        &self.template
    }

    /// Customization applied on top of the template.
    #[must_use]
    pub const fn overrides(&self) -> &RequestOverride {
        &self.overrides
    }

    /// Check body.
    #[must_use]
    pub const fn body(&self) -> &TestBody {
        &self.body
    }

    /// Reason the test is not implemented yet, if it is a stub.
    #[must_use]
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }
}

/// Anything that can declare a collection of request-bound tests.
pub trait Suite {
    /// Suite name, used in reports and for selection.
    fn name(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str {
        ""
    }

    /// Every test this suite declares, in run order.
    fn bindings(&self) -> Vec<TestBinding>;
}

/// Ordered collection of registered test cases for one suite.
#[derive(Debug, Clone, Default)]
pub struct TestRegistry {
    suite: String,
    cases: Vec<Arc<TestCase>>,
    names: HashSet<String>,
}

impl TestRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            cases: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Registers every binding a suite declares.
    ///
    /// # Errors
    ///
    /// Fails on the first binding whose template is unknown, whose name is
    /// already taken or whose override is invalid; nothing has run at that
    /// point.
    pub fn from_suite<S: Suite + ?Sized>(
        suite: &S,
        store: &TemplateStore,
    ) -> ApplicationResult<Self> {
        let mut registry = Self::new(suite.name());
        for binding in suite.bindings() {
            registry.register(store, binding)?;
        }
        tracing::debug!(suite = suite.name(), tests = registry.len(), "registered suite");
        Ok(registry)
    }

    /// Registers one binding without running it.
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound` for an unknown template, `DuplicateTest`
    /// for a repeated name and `Domain` for an override that cannot apply,
    /// such as an unknown `METHOD`.
    pub fn register(
        &mut self,
        store: &TemplateStore,
        binding: TestBinding,
    ) -> ApplicationResult<&TestCase> {
        if self.names.contains(&binding.name) {
            return Err(ApplicationError::DuplicateTest(binding.name));
        }
        let template = store.resolve(&binding.template_id)?;
        binding.overrides.validate()?;
        let case = TestCase {
            index: self.cases.len(),
            name: binding.name,
            description: binding.description,
            template,
            overrides: binding.overrides,
            body: binding.body,
            pending: binding.pending,
        };
        self.names.insert(case.name.clone());
        self.cases.push(Arc::new(case));
        Ok(self.cases[self.cases.len() - 1].as_ref())
    }

    /// Suite name.
    #[must_use]
    pub fn suite(&self) -> &str {
        &self.suite
    }

    /// Registered cases, in registration order.
    #[must_use]
    pub fn cases(&self) -> &[Arc<TestCase>] {
        &self.cases
    }

    /// Looks up a case by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TestCase> {
        self.cases.iter().find(|c| c.name == name).map(|c| c.as_ref())
    }

    /// Number of registered cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
