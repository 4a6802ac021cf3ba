//! Check results and run reports.
//!
//! This module provides the types a run produces: one [`CheckResult`] per
//! assertion, one [`ReportEntry`] per test case and a [`Report`] per run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a check looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Exact status code.
    Status,
    /// Header value equals.
    HeaderExact,
    /// Header value starts with.
    HeaderPrefix,
    /// Header is present.
    HeaderPresent,
    /// Header value matches a regex.
    HeaderMatches,
    /// Body contains text.
    BodyContains,
    /// Check written by the test author.
    Custom,
}

impl CheckKind {
    /// Short label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::HeaderExact => "header",
            Self::HeaderPrefix => "header prefix",
            Self::HeaderPresent => "header present",
            Self::HeaderMatches => "header matches",
            Self::BodyContains => "body contains",
            Self::Custom => "custom",
        }
    }
}

/// Result of one check against a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// What was checked.
    pub kind: CheckKind,
    /// Header name, for header checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Expected value, rendered as text.
    pub expected: String,
    /// Actual value found; `None` when absent (missing header, no response).
    pub actual: Option<String>,
    /// Whether the check passed.
    pub passed: bool,
    /// Human-readable explanation.
    pub message: String,
}

impl CheckResult {
    /// Create a passed result.
    #[must_use]
    pub fn pass(kind: CheckKind, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        let expected = expected.into();
        let actual = actual.into();
        Self {
            kind,
            subject: None,
            message: format!("{} is {actual}", kind.label()),
            expected,
            actual: Some(actual),
            passed: true,
        }
    }

    /// Create a failed result.
    #[must_use]
    pub fn fail(
        kind: CheckKind,
        expected: impl Into<String>,
        actual: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            subject: None,
            expected: expected.into(),
            actual,
            passed: false,
            message: message.into(),
        }
    }

    /// Attaches the header (or other subject) this check looked at.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Replaces the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Overall outcome of one test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every check passed.
    Passed,
    /// At least one check failed.
    Failed,
    /// No usable response, or the test body itself broke.
    Errored,
    /// The test body is an intentional stub.
    NotImplemented,
}

impl Outcome {
    /// Label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Failed => "FAIL",
            Self::Errored => "ERROR",
            Self::NotImplemented => "TODO",
        }
    }

    /// Derives the outcome from check results alone.
    #[must_use]
    pub fn from_checks(checks: &[CheckResult]) -> Self {
        if checks.iter().all(|c| c.passed) {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

/// The aggregated outcome and evidence for one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Registration index; report order.
    pub index: usize,
    /// Test name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Checks in the order the body ran them.
    pub checks: Vec<CheckResult>,
    /// Overall outcome.
    pub outcome: Outcome,
    /// Why the entry errored or was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Wall time for dispatch plus body.
    #[serde(with = "crate::serde_duration")]
    pub duration: Duration,
}

impl ReportEntry {
    /// Number of failed checks.
    #[must_use]
    pub fn failed_checks(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }
}

/// Counts per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of entries.
    pub total: usize,
    /// Entries that passed.
    pub passed: usize,
    /// Entries that failed.
    pub failed: usize,
    /// Entries that errored.
    pub errored: usize,
    /// Entries that are stubs.
    pub not_implemented: usize,
}

impl ReportSummary {
    /// Pass rate as a percentage, ignoring not-implemented entries.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        let counted = self.total - self.not_implemented;
        if counted == 0 {
            100.0
        } else {
            (self.passed as f64 / counted as f64) * 100.0
        }
    }

    /// True when nothing failed or errored.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }
}

/// Report for one run of a suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Unique identifier of the run.
    pub run_id: Uuid,
    /// Suite that was run.
    pub suite: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// One entry per executed test case, in registration order.
    pub entries: Vec<ReportEntry>,
    /// True if the run stopped before every case executed.
    pub cancelled: bool,
}

impl Report {
    /// Creates an empty report for a suite.
    #[must_use]
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            suite: suite.into(),
            started_at: Utc::now(),
            entries: Vec::new(),
            cancelled: false,
        }
    }

    /// Counts entries per outcome.
    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        self.entries
            .iter()
            .fold(ReportSummary::default(), |mut acc, entry| {
                acc.total += 1;
                match entry.outcome {
                    Outcome::Passed => acc.passed += 1,
                    Outcome::Failed => acc.failed += 1,
                    Outcome::Errored => acc.errored += 1,
                    Outcome::NotImplemented => acc.not_implemented += 1,
                }
                acc
            })
    }

    /// Looks up an entry by test name.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}
