//! Plain text report.

use std::fmt::Write;

use servertester_domain::{Outcome, Report};

/// Renders a report for a terminal.
///
/// One line per test case, followed by the failing checks of failed cases
/// and the message of errored or not implemented ones, then a summary.
#[must_use]
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Suite {} (run {})", report.suite, report.run_id);

    for entry in &report.entries {
        let _ = write!(
            out,
            "[{:<5}] {} ({} ms)",
            entry.outcome.label(),
            entry.name,
            entry.duration.as_millis()
        );
        if !entry.description.is_empty() {
            let _ = write!(out, " - {}", entry.description);
        }
        out.push('\n');

        match entry.outcome {
            Outcome::Failed => {
                for check in entry.checks.iter().filter(|c| !c.passed) {
                    let _ = writeln!(out, "        {}", check.message);
                }
                if let Some(message) = &entry.message {
                    let _ = writeln!(out, "        {message}");
                }
            }
            Outcome::Errored | Outcome::NotImplemented => {
                if let Some(message) = &entry.message {
                    let _ = writeln!(out, "        {message}");
                }
            }
            Outcome::Passed => {}
        }
    }

    let summary = report.summary();
    let _ = writeln!(
        out,
        "\n{} tests: {} passed, {} failed, {} errored, {} not implemented ({:.1}% pass rate)",
        summary.total,
        summary.passed,
        summary.failed,
        summary.errored,
        summary.not_implemented,
        summary.pass_rate()
    );
    if report.cancelled {
        out.push_str("run cancelled before every test executed\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use servertester_domain::{CheckKind, CheckResult, ReportEntry};
    use std::time::Duration;

    fn entry(index: usize, name: &str, outcome: Outcome) -> ReportEntry {
        ReportEntry {
            index,
            name: name.into(),
            description: String::new(),
            checks: Vec::new(),
            outcome,
            message: None,
            duration: Duration::from_millis(3),
        }
    }

    #[test]
    fn test_render_text() {
        let mut report = Report::new("cs531a4");
        let mut failed = entry(0, "test_basic_auth_realm", Outcome::Failed);
        failed.checks = vec![
            CheckResult::fail(
                CheckKind::Status,
                "401",
                Some("200".into()),
                "expected status 401, got 200",
            ),
            CheckResult::pass(CheckKind::Status, "200", "200"),
        ];
        let mut stub = entry(1, "test_2", Outcome::NotImplemented);
        stub.message = Some("Yet to be implemented!".into());
        let mut passed = entry(2, "test_nested_basic_auth", Outcome::Passed);
        passed.description = "nested basic auth".into();
        report.entries = vec![failed, stub, passed];
        report.cancelled = true;

        let text = render_text(&report);

        assert!(text.contains(
            "[FAIL ] test_basic_auth_realm (3 ms)\n        expected status 401, got 200\n"
        ));
        assert!(!text.contains("status is 200"));
        assert!(text.contains("[TODO ] test_2 (3 ms)\n        Yet to be implemented!\n"));
        assert!(text.contains("[PASS ] test_nested_basic_auth (3 ms) - nested basic auth\n"));
        assert!(text.contains(
            "3 tests: 1 passed, 1 failed, 0 errored, 1 not implemented (50.0% pass rate)"
        ));
        assert!(text.ends_with("run cancelled before every test executed\n"));
    }
}
