//! Assertion library.
//!
//! Each `check_*` function is pure: it looks at a [`ResponseCapture`] and
//! returns a [`CheckResult`]. A mismatch is a failed result, never an error.
//! Test bodies normally go through [`Checks`], which records every result in
//! order and never short-circuits.

use regex::Regex;
use servertester_domain::{CheckKind, CheckResult, ResponseCapture};
use thiserror::Error;

/// Ways a test body can stop other than returning `Ok(())`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TestFailure {
    /// The body is an intentional stub.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A fatal check failed; the failing result is already recorded.
    #[error("required check failed")]
    RequiredCheckFailed,

    /// The body itself broke.
    #[error("{0}")]
    Error(String),
}

impl TestFailure {
    /// Creates an unexpected-failure value from any message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }
}

/// What a test body returns.
pub type BodyResult = Result<(), TestFailure>;

/// Marks a test body as an intentional stub.
///
/// # Errors
///
/// Always returns [`TestFailure::NotImplemented`].
pub fn not_implemented(reason: impl Into<String>) -> BodyResult {
    Err(TestFailure::NotImplemented(reason.into()))
}

/// Turns a recorded check into a fatal one.
///
/// ```
/// # use servertester_application::checks::{Checks, require, BodyResult};
/// fn body(checks: &mut Checks<'_>) -> BodyResult {
///     require(checks.status_is(401))?;
///     checks.header_begins("WWW-Authenticate", "Digest");
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// Returns [`TestFailure::RequiredCheckFailed`] when `passed` is false.
pub const fn require(passed: bool) -> BodyResult {
    if passed {
        Ok(())
    } else {
        Err(TestFailure::RequiredCheckFailed)
    }
}

fn no_response(kind: CheckKind, expected: String, capture: &ResponseCapture) -> CheckResult {
    let reason = capture
        .transport_error
        .as_ref()
        .map_or_else(|| "no response".to_string(), ToString::to_string);
    CheckResult::fail(kind, expected, None, format!("no response to check: {reason}"))
}

/// Exact status code match.
#[must_use]
pub fn check_status_is(capture: &ResponseCapture, expected: u16) -> CheckResult {
    let kind = CheckKind::Status;
    let Some(actual) = capture.status else {
        return no_response(kind, expected.to_string(), capture);
    };
    if actual == expected {
        CheckResult::pass(kind, expected.to_string(), actual.to_string())
    } else {
        CheckResult::fail(
            kind,
            expected.to_string(),
            Some(actual.to_string()),
            format!("expected status {expected}, got {actual}"),
        )
    }
}

/// Shared shape of the header value checks.
///
/// Passes when any value of the header satisfies `accept`; the reported
/// actual value is the first satisfying one, or the first value on failure.
fn check_header_value(
    capture: &ResponseCapture,
    kind: CheckKind,
    name: &str,
    expected: &str,
    accept: impl Fn(&str) -> bool,
    describe: &str,
) -> CheckResult {
    if capture.is_transport_error() {
        return no_response(kind, expected.to_string(), capture).with_subject(name);
    }
    let values: Vec<&str> = capture.header_values(name).collect();
    let Some(first) = values.first() else {
        return CheckResult::fail(
            kind,
            expected,
            None,
            format!("header '{name}' not found"),
        )
        .with_subject(name);
    };
    match values.iter().find(|v| accept(v)) {
        Some(found) => CheckResult::pass(kind, expected, *found)
            .with_subject(name)
            .with_message(format!("header '{name}' {describe} '{expected}'")),
        None => CheckResult::fail(
            kind,
            expected,
            Some((*first).to_string()),
            format!("header '{name}' value '{first}' does not {describe} '{expected}'"),
        )
        .with_subject(name),
    }
}

/// Case-insensitive header lookup, exact value match.
#[must_use]
pub fn check_header_is(capture: &ResponseCapture, name: &str, expected: &str) -> CheckResult {
    check_header_value(
        capture,
        CheckKind::HeaderExact,
        name,
        expected,
        |v| v == expected,
        "equal",
    )
}

/// Case-insensitive header lookup, prefix match on the value.
#[must_use]
pub fn check_header_begins(capture: &ResponseCapture, name: &str, prefix: &str) -> CheckResult {
    check_header_value(
        capture,
        CheckKind::HeaderPrefix,
        name,
        prefix,
        |v| v.starts_with(prefix),
        "begin with",
    )
}

/// Header regex match. An invalid pattern is a failed check.
#[must_use]
pub fn check_header_matches(capture: &ResponseCapture, name: &str, pattern: &str) -> CheckResult {
    match Regex::new(pattern) {
        Ok(regex) => check_header_value(
            capture,
            CheckKind::HeaderMatches,
            name,
            pattern,
            |v| regex.is_match(v),
            "match",
        ),
        Err(e) => CheckResult::fail(
            CheckKind::HeaderMatches,
            pattern,
            None,
            format!("invalid regex pattern '{pattern}': {e}"),
        )
        .with_subject(name),
    }
}

/// Header presence, whatever its value.
#[must_use]
pub fn check_header_present(capture: &ResponseCapture, name: &str) -> CheckResult {
    let kind = CheckKind::HeaderPresent;
    if capture.is_transport_error() {
        return no_response(kind, "present".to_string(), capture).with_subject(name);
    }
    match capture.header(name) {
        Some(value) => CheckResult::pass(kind, "present", value)
            .with_subject(name)
            .with_message(format!("header '{name}' is present")),
        None => CheckResult::fail(kind, "present", None, format!("header '{name}' not found"))
            .with_subject(name),
    }
}

/// Body contains the given text.
#[must_use]
pub fn check_body_contains(capture: &ResponseCapture, text: &str) -> CheckResult {
    let kind = CheckKind::BodyContains;
    if capture.is_transport_error() {
        return no_response(kind, text.to_string(), capture);
    }
    let body = capture.body_text();
    if body.contains(text) {
        CheckResult::pass(kind, text, preview(&body))
            .with_message(format!("body contains '{text}'"))
    } else {
        CheckResult::fail(
            kind,
            text,
            Some(preview(&body)),
            format!("body does not contain '{text}'"),
        )
    }
}

/// A check whose outcome the test author computed.
#[must_use]
pub fn check_custom(description: &str, passed: bool, actual: Option<String>) -> CheckResult {
    CheckResult {
        kind: CheckKind::Custom,
        subject: None,
        expected: description.to_string(),
        actual,
        passed,
        message: description.to_string(),
    }
}

fn preview(body: &str) -> String {
    const MAX: usize = 100;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Records checks for one test case.
///
/// Every method records its result and returns whether it passed, so a body
/// can branch on it or make it fatal with [`require`].
#[derive(Debug)]
pub struct Checks<'a> {
    capture: &'a ResponseCapture,
    results: Vec<CheckResult>,
}

impl<'a> Checks<'a> {
    /// Creates an empty recorder over a capture.
    #[must_use]
    pub const fn new(capture: &'a ResponseCapture) -> Self {
        Self {
            capture,
            results: Vec::new(),
        }
    }

    /// The response under test.
    #[must_use]
    pub const fn capture(&self) -> &'a ResponseCapture {
        self.capture
    }

    /// Records an already computed result.
    pub fn record(&mut self, result: CheckResult) -> bool {
        let passed = result.passed;
        self.results.push(result);
        passed
    }

    /// See [`check_status_is`].
    pub fn status_is(&mut self, expected: u16) -> bool {
        self.record(check_status_is(self.capture, expected))
    }

    /// See [`check_header_is`].
    pub fn header_is(&mut self, name: &str, expected: &str) -> bool {
        self.record(check_header_is(self.capture, name, expected))
    }

    /// See [`check_header_begins`].
    pub fn header_begins(&mut self, name: &str, prefix: &str) -> bool {
        self.record(check_header_begins(self.capture, name, prefix))
    }

    /// See [`check_header_matches`].
    pub fn header_matches(&mut self, name: &str, pattern: &str) -> bool {
        self.record(check_header_matches(self.capture, name, pattern))
    }

    /// See [`check_header_present`].
    pub fn header_present(&mut self, name: &str) -> bool {
        self.record(check_header_present(self.capture, name))
    }

    /// See [`check_body_contains`].
    pub fn body_contains(&mut self, text: &str) -> bool {
        self.record(check_body_contains(self.capture, text))
    }

    /// See [`check_custom`].
    pub fn custom(&mut self, description: &str, passed: bool, actual: Option<String>) -> bool {
        self.record(check_custom(description, passed, actual))
    }

    /// Results recorded so far.
    #[must_use]
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// Consumes the recorder, returning its results in order.
    #[must_use]
    pub fn into_results(self) -> Vec<CheckResult> {
        self.results
    }
}
