//! Suite runner.
//!
//! Executes every registered test case and aggregates a [`Report`]. Each
//! case is isolated: a transport failure, an error returned by the body or a
//! panic inside it ends up in that case's entry and the run moves on.
//! Pending cases are reported as not implemented without sending anything.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::{Duration, Instant};

use servertester_domain::{CheckResult, Outcome, Report, ReportEntry, ResponseCapture};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::checks::{BodyResult, Checks, TestFailure};
use crate::dispatcher::Dispatcher;
use crate::ports::{CancellationReceiver, HttpClient};
use crate::registry::{TestCase, TestRegistry};

/// Runs suites against a server through a [`Dispatcher`].
pub struct SuiteRunner<C: HttpClient> {
    dispatcher: Arc<Dispatcher<C>>,
    concurrency: usize,
}

impl<C: HttpClient + 'static> SuiteRunner<C> {
    /// Creates a sequential runner.
    #[must_use]
    pub fn new(dispatcher: Dispatcher<C>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            concurrency: 1,
        }
    }

    /// Allows up to `limit` test cases in flight at once.
    #[must_use]
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Runs every registered case to completion.
    pub async fn run(&self, registry: &TestRegistry) -> Report {
        self.run_with_cancellation(registry, &CancellationReceiver::never())
            .await
    }

    /// Runs registered cases until done or cancelled.
    ///
    /// Cancellation is checked before each case starts. Cases already
    /// started finish and keep their entries; the rest are skipped and the
    /// report is flagged as cancelled.
    pub async fn run_with_cancellation(
        &self,
        registry: &TestRegistry,
        cancel: &CancellationReceiver,
    ) -> Report {
        let mut report = Report::new(registry.suite());
        tracing::info!(
            suite = registry.suite(),
            tests = registry.len(),
            concurrency = self.concurrency,
            "starting run"
        );

        if self.concurrency <= 1 {
            for case in registry.cases() {
                if cancel.is_cancelled() {
                    report.cancelled = true;
                    break;
                }
                report.entries.push(run_case(&self.dispatcher, case).await);
            }
        } else {
            let (entries, cancelled) = self.run_parallel(registry, cancel).await;
            report.entries = entries;
            report.cancelled = cancelled;
        }

        let summary = report.summary();
        tracing::info!(
            suite = registry.suite(),
            passed = summary.passed,
            failed = summary.failed,
            errored = summary.errored,
            not_implemented = summary.not_implemented,
            cancelled = report.cancelled,
            "run finished"
        );
        report
    }

    async fn run_parallel(
        &self,
        registry: &TestRegistry,
        cancel: &CancellationReceiver,
    ) -> (Vec<ReportEntry>, bool) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut started = BTreeMap::new();
        let mut cancelled = false;

        for case in registry.cases() {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            started.insert(case.index(), Arc::clone(case));
            let dispatcher = Arc::clone(&self.dispatcher);
            let case = Arc::clone(case);
            tasks.spawn(async move {
                let entry = run_case(&dispatcher, &case).await;
                drop(permit);
                entry
            });
        }

        let mut entries = Vec::with_capacity(started.len());
        let mut lost = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => {
                    started.remove(&entry.index);
                    entries.push(entry);
                }
                Err(e) => {
                    tracing::error!(error = %e, "test task did not complete");
                    lost.push(e.to_string());
                }
            }
        }
        // Cases whose task died still get an entry.
        let reason = lost.join("; ");
        entries.extend(started.values().map(|case| {
            errored_entry(case, format!("test task did not complete: {reason}"))
        }));

        entries.sort_by_key(|e| e.index);
        (entries, cancelled)
    }
}

fn errored_entry(case: &TestCase, message: String) -> ReportEntry {
    ReportEntry {
        index: case.index(),
        name: case.name().to_string(),
        description: case.description().to_string(),
        checks: Vec::new(),
        outcome: Outcome::Errored,
        message: Some(message),
        duration: Duration::ZERO,
    }
}

/// Dispatches one case, runs its body and builds its entry.
async fn run_case<C: HttpClient>(dispatcher: &Dispatcher<C>, case: &TestCase) -> ReportEntry {
    let start = Instant::now();

    let (checks, outcome, message) = if let Some(reason) = case.pending() {
        (Vec::new(), Outcome::NotImplemented, Some(reason.to_string()))
    } else {
        let capture = dispatcher.execute(case).await;
        if let Some(err) = &capture.transport_error {
            (Vec::new(), Outcome::Errored, Some(err.to_string()))
        } else {
            let (checks, result) = run_body(case, &capture);
            let (outcome, message) = classify(&checks, result);
            (checks, outcome, message)
        }
    };

    let entry = ReportEntry {
        index: case.index(),
        name: case.name().to_string(),
        description: case.description().to_string(),
        checks,
        outcome,
        message,
        duration: start.elapsed(),
    };
    tracing::info!(
        test = %entry.name,
        outcome = entry.outcome.label(),
        failed_checks = entry.failed_checks(),
        "test finished"
    );
    entry
}

/// Runs a body, turning a panic into an error result.
fn run_body(case: &TestCase, capture: &ResponseCapture) -> (Vec<CheckResult>, BodyResult) {
    let mut checks = Checks::new(capture);
    let result = catch_unwind(AssertUnwindSafe(|| case.body().call(&mut checks)))
        .unwrap_or_else(|payload| Err(TestFailure::Error(panic_message(payload.as_ref()))));
    (checks.into_results(), result)
}

/// Outcome precedence: body error, then stub marker, then check results.
fn classify(checks: &[CheckResult], result: BodyResult) -> (Outcome, Option<String>) {
    match result {
        Err(TestFailure::Error(message)) => (Outcome::Errored, Some(message)),
        Err(TestFailure::NotImplemented(reason)) => (Outcome::NotImplemented, Some(reason)),
        Err(TestFailure::RequiredCheckFailed) => (
            Outcome::Failed,
            Some("stopped at a required check".to_string()),
        ),
        Ok(()) => (Outcome::from_checks(checks), None),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("test body panicked: {detail}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::checks::{not_implemented, require};
    use crate::ports::{CancellationToken, HttpClientError, OutboundRequest};
    use crate::registry::TestBinding;
    use crate::template_store::TemplateStore;
    use pretty_assertions::assert_eq;
    use servertester_domain::{Headers, RequestTemplate, RunSettings};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers by path; unknown paths are refused.
    struct RoutedClient {
        routes: Vec<(&'static str, u16, Vec<(&'static str, &'static str)>)>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl RoutedClient {
        fn new(routes: Vec<(&'static str, u16, Vec<(&'static str, &'static str)>)>) -> Self {
            Self {
                routes,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl HttpClient for RoutedClient {
        fn execute(
            &self,
            request: &OutboundRequest,
        ) -> Pin<Box<dyn Future<Output = Result<ResponseCapture, HttpClientError>> + Send + '_>>
        {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let path = request.url.path().to_string();
            let delay = self.delay;
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                self.routes
                    .iter()
                    .find(|(p, _, _)| *p == path)
                    .map(|(_, status, headers)| {
                        let headers: Headers = headers.iter().copied().collect();
                        ResponseCapture::received(*status, headers, Vec::new(), delay)
                    })
                    .ok_or(HttpClientError::ConnectionRefused {
                        host: "localhost".into(),
                        port: 80,
                    })
            })
        }
    }

    fn registry(bindings: Vec<TestBinding>) -> TestRegistry {
        let store = TemplateStore::new().with_template(RequestTemplate::new("get-url-ua").unwrap());
        let mut registry = TestRegistry::new("suite");
        for binding in bindings {
            registry.register(&store, binding).unwrap();
        }
        registry
    }

    fn runner(client: RoutedClient) -> SuiteRunner<RoutedClient> {
        let dispatcher = Dispatcher::new(Arc::new(client), &RunSettings::default()).unwrap();
        SuiteRunner::new(dispatcher)
    }

    fn basic_realm(path: &'static str) -> TestBinding {
        TestBinding::new("test_basic_auth_realm", "get-url-ua")
            .param("PATH", path)
            .param("USERAGENT", "Checker")
            .check(|c| {
                c.status_is(401);
                c.header_is("WWW-Authenticate", r#"Basic realm="Fried Twice""#);
                Ok(())
            })
    }

    #[tokio::test]
    async fn test_passing_scenario() {
        let client = RoutedClient::new(vec![(
            "/a4-test/limited1/protected",
            401,
            vec![("WWW-Authenticate", r#"Basic realm="Fried Twice""#)],
        )]);
        let report = runner(client)
            .run(&registry(vec![basic_realm("/a4-test/limited1/protected")]))
            .await;

        let entry = &report.entries[0];
        assert_eq!(entry.outcome, Outcome::Passed);
        assert_eq!(entry.checks.len(), 2);
        assert!(entry.checks.iter().all(|c| c.passed));
    }

    #[tokio::test]
    async fn test_failing_scenario_records_expected_and_actual() {
        let client = RoutedClient::new(vec![("/a4-test/limited1/protected", 200, vec![])]);
        let report = runner(client)
            .run(&registry(vec![basic_realm("/a4-test/limited1/protected")]))
            .await;

        let entry = &report.entries[0];
        assert_eq!(entry.outcome, Outcome::Failed);
        assert_eq!(entry.checks.len(), 2);
        assert_eq!(entry.checks[0].expected, "401");
        assert_eq!(entry.checks[0].actual.as_deref(), Some("200"));
        assert!(!entry.checks[1].passed);
    }

    #[tokio::test]
    async fn test_transport_failure_is_errored_with_no_checks() {
        let client = RoutedClient::new(vec![]);
        let report = runner(client)
            .run(&registry(vec![basic_realm("/nowhere")]))
            .await;

        let entry = &report.entries[0];
        assert_eq!(entry.outcome, Outcome::Errored);
        assert!(entry.checks.is_empty());
        assert!(entry.message.as_deref().unwrap().contains("Connection refused"));
    }

    #[tokio::test]
    async fn test_outcomes_are_isolated_and_ordered() {
        let client = RoutedClient::new(vec![("/", 200, vec![])]);
        let report = runner(client)
            .run(&registry(vec![
                TestBinding::new("stub", "get-url-ua").check(|c| {
                    not_implemented("Yet to be implemented!")?;
                    c.status_is(200);
                    Ok(())
                }),
                TestBinding::new("panics", "get-url-ua").check(|c| {
                    c.status_is(200);
                    panic!("bug in test");
                }),
                TestBinding::new("errors", "get-url-ua")
                    .check(|_| Err(TestFailure::error("fixture missing"))),
                TestBinding::new("fatal", "get-url-ua").check(|c| {
                    require(c.status_is(404))?;
                    c.status_is(200);
                    Ok(())
                }),
                TestBinding::new("passes", "get-url-ua").check(|c| {
                    c.status_is(200);
                    Ok(())
                }),
            ]))
            .await;

        let outcomes: Vec<_> = report
            .entries
            .iter()
            .map(|e| (e.name.as_str(), e.outcome))
            .collect();
        assert_eq!(outcomes, vec![
            ("stub", Outcome::NotImplemented),
            ("panics", Outcome::Errored),
            ("errors", Outcome::Errored),
            ("fatal", Outcome::Failed),
            ("passes", Outcome::Passed),
        ]);

        let stub = report.entry("stub").unwrap();
        assert!(stub.checks.is_empty());
        assert_eq!(stub.message.as_deref(), Some("Yet to be implemented!"));

        let panics = report.entry("panics").unwrap();
        assert_eq!(panics.checks.len(), 1);
        assert_eq!(
            panics.message.as_deref(),
            Some("test body panicked: bug in test")
        );

        assert_eq!(report.entry("fatal").unwrap().checks.len(), 1);
        assert!(!report.cancelled);
    }

    #[tokio::test]
    async fn test_pending_case_sends_nothing_even_when_server_is_down() {
        let client = RoutedClient::new(vec![]);
        let runner = runner(client);

        let report = runner
            .run(&registry(vec![
                TestBinding::new("stub", "get-url-ua")
                    .pending("Yet to be implemented!")
                    .check(|c| {
                        c.status_is(200);
                        Ok(())
                    }),
                basic_realm("/nowhere"),
            ]))
            .await;

        let stub = &report.entries[0];
        assert_eq!(stub.outcome, Outcome::NotImplemented);
        assert!(stub.checks.is_empty());
        assert_eq!(stub.message.as_deref(), Some("Yet to be implemented!"));
        assert_eq!(report.entries[1].outcome, Outcome::Errored);
        assert_eq!(runner.dispatcher.client_calls(), 1);
    }

    #[tokio::test]
    async fn test_parallel_run_gives_every_case_an_entry() {
        let client = RoutedClient::new(vec![("/", 200, vec![])]);
        let registry = registry(vec![
            TestBinding::new("panics", "get-url-ua").check(|_| panic!("bug in test")),
            TestBinding::new("stub", "get-url-ua").pending("later"),
            TestBinding::new("refused", "get-url-ua").param("PATH", "/nowhere"),
            TestBinding::new("passes", "get-url-ua").check(|c| {
                c.status_is(200);
                Ok(())
            }),
        ]);

        let report = runner(client).with_concurrency(4).run(&registry).await;

        let outcomes: Vec<_> = report
            .entries
            .iter()
            .map(|e| (e.index, e.outcome))
            .collect();
        assert_eq!(outcomes, vec![
            (0, Outcome::Errored),
            (1, Outcome::NotImplemented),
            (2, Outcome::Errored),
            (3, Outcome::Passed),
        ]);
    }

    #[test]
    fn test_errored_entry_for_lost_task() {
        let registry = registry(vec![TestBinding::new("lost", "get-url-ua").describe("d")]);

        let entry = errored_entry(&registry.cases()[0], "task aborted".to_string());

        assert_eq!(entry.index, 0);
        assert_eq!(entry.name, "lost");
        assert_eq!(entry.description, "d");
        assert_eq!(entry.outcome, Outcome::Errored);
        assert!(entry.checks.is_empty());
        assert_eq!(entry.message.as_deref(), Some("task aborted"));
    }

    #[tokio::test]
    async fn test_parallel_run_keeps_registration_order() {
        let mut client = RoutedClient::new(vec![("/", 200, vec![])]);
        client.delay = Duration::from_millis(5);
        let bindings = (0..8)
            .map(|i| {
                TestBinding::new(format!("test_{i}"), "get-url-ua").check(|c| {
                    c.status_is(200);
                    Ok(())
                })
            })
            .collect();
        let registry = registry(bindings);

        let report = runner(client).with_concurrency(3).run(&registry).await;

        let indices: Vec<_> = report.entries.iter().map(|e| e.index).collect();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
        assert!(report.entries.iter().all(|e| e.outcome == Outcome::Passed));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_runs_nothing() {
        let client = RoutedClient::new(vec![("/", 200, vec![])]);
        let runner = runner(client);
        let (token, receiver) = CancellationToken::new();
        token.cancel();

        let report = runner
            .run_with_cancellation(&registry(vec![basic_realm("/")]), &receiver)
            .await;

        assert!(report.cancelled);
        assert!(report.entries.is_empty());
        assert_eq!(runner.dispatcher.client_calls(), 0);
    }

    #[tokio::test]
    async fn test_cancel_between_cases_keeps_finished_entries() {
        let client = RoutedClient::new(vec![("/", 200, vec![])]);
        let (token, receiver) = CancellationToken::new();
        let token = Arc::new(token);
        let cancel_after_first = Arc::clone(&token);

        let report = runner(client)
            .run_with_cancellation(
                &registry(vec![
                    TestBinding::new("first", "get-url-ua").check(move |c| {
                        c.status_is(200);
                        cancel_after_first.cancel();
                        Ok(())
                    }),
                    TestBinding::new("second", "get-url-ua"),
                ]),
                &receiver,
            )
            .await;

        assert!(report.cancelled);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].name, "first");
        assert_eq!(report.entries[0].outcome, Outcome::Passed);
    }

    impl Dispatcher<RoutedClient> {
        fn client_calls(&self) -> usize {
            self.client().calls.load(Ordering::SeqCst)
        }
    }
}
