//! Runs suites through the real reqwest adapter against an in-process server.

#![allow(clippy::unwrap_used, missing_docs)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::{Router, routing};
use pretty_assertions::assert_eq;
use servertester_application::{Dispatcher, SuiteRunner, TemplateStore, TestBinding, TestRegistry};
use servertester_domain::{Outcome, Report, RunSettings, TransportErrorKind};
use servertester_infrastructure::{BuiltinTemplates, ReqwestHttpClient};

const CHECKER: &str = "CS 531-f18 A4 automated Checker";

#[derive(Default)]
struct Seen {
    user_agents: Vec<String>,
    hosts: Vec<String>,
}

async fn start_server(seen: Arc<Mutex<Seen>>) -> SocketAddr {
    let record = move |headers: &HeaderMap| {
        let mut seen = seen.lock().unwrap();
        let value = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        seen.user_agents.push(value(header::USER_AGENT));
        seen.hosts.push(value(header::HOST));
    };
    let root = {
        let record = record.clone();
        move |headers: HeaderMap| async move {
            record(&headers);
            "root"
        }
    };
    let basic = move |headers: HeaderMap| async move {
        record(&headers);
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, r#"Basic realm="Fried Twice""#)],
        )
    };

    let app = Router::new()
        .route("/", routing::get(root))
        .route("/a4-test/limited1/protected", routing::get(basic))
        .route(
            "/a4-test/limited2/foo/bar.txt",
            routing::get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    [(
                        header::WWW_AUTHENTICATE,
                        r#"Digest realm="Colonel", nonce="abc", algorithm=MD5, qop="auth""#,
                    )],
                )
            }),
        )
        .route("/a4-test/open", routing::get(|| async { "hello" }))
        .route(
            "/a4-test/moved",
            routing::get(|| async {
                (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/a4-test/open")])
            }),
        )
        .route(
            "/a4-test/slow",
            routing::get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late".into_response()
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}

async fn run(port: u16, timeout_ms: u64, bindings: Vec<TestBinding>) -> Report {
    let mut store = TemplateStore::new();
    store.load_from(&BuiltinTemplates).await.unwrap();

    let mut registry = TestRegistry::new("e2e");
    for binding in bindings {
        registry.register(&store, binding).unwrap();
    }

    let settings = RunSettings {
        host: "127.0.0.1".into(),
        port,
        timeout_ms,
        ..Default::default()
    };
    let client = Arc::new(ReqwestHttpClient::new().unwrap());
    let dispatcher = Dispatcher::new(client, &settings).unwrap();
    SuiteRunner::new(dispatcher).run(&registry).await
}

fn basic_auth_realm(path: &str) -> TestBinding {
    TestBinding::new("test_basic_auth_realm", "get-url-ua")
        .param("PATH", path)
        .param("USERAGENT", CHECKER)
        .check(|c| {
            c.status_is(401);
            c.header_is("WWW-Authenticate", r#"Basic realm="Fried Twice""#);
            Ok(())
        })
}

#[tokio::test]
async fn test_protected_resource_passes() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let addr = start_server(Arc::clone(&seen)).await;

    let report = run(addr.port(), 5_000, vec![
        basic_auth_realm("/a4-test/limited1/protected"),
        TestBinding::new("test_nested_digest_auth", "get-url-ua")
            .param("PATH", "/a4-test/limited2/foo/bar.txt")
            .param("USERAGENT", CHECKER)
            .check(|c| {
                c.status_is(401);
                c.header_begins("WWW-Authenticate", "Digest");
                Ok(())
            }),
    ])
    .await;

    assert_eq!(
        report.entries.iter().map(|e| e.outcome).collect::<Vec<_>>(),
        vec![Outcome::Passed, Outcome::Passed]
    );
    let seen = seen.lock().unwrap();
    assert_eq!(seen.user_agents, vec![CHECKER]);
    assert_eq!(seen.hosts, vec![format!("127.0.0.1:{}", addr.port())]);
}

#[tokio::test]
async fn test_builtin_template_defaults_to_root() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let addr = start_server(Arc::clone(&seen)).await;

    let report = run(addr.port(), 5_000, vec![
        TestBinding::new("root", "get-url-ua").check(|c| {
            c.status_is(200);
            Ok(())
        }),
    ])
    .await;

    assert_eq!(report.entries[0].outcome, Outcome::Passed);
    assert_eq!(seen.lock().unwrap().user_agents, vec!["servertester"]);
}

#[tokio::test]
async fn test_unprotected_resource_fails_with_evidence() {
    let addr = start_server(Arc::default()).await;

    let report = run(addr.port(), 5_000, vec![basic_auth_realm("/a4-test/open")]).await;

    let entry = &report.entries[0];
    assert_eq!(entry.outcome, Outcome::Failed);
    assert_eq!(entry.checks.len(), 2);
    assert_eq!(entry.checks[0].expected, "401");
    assert_eq!(entry.checks[0].actual.as_deref(), Some("200"));
    assert!(!entry.checks[1].passed);
    assert_eq!(entry.checks[1].actual, None);
}

#[tokio::test]
async fn test_redirects_are_not_followed() {
    let addr = start_server(Arc::default()).await;

    let report = run(addr.port(), 5_000, vec![
        TestBinding::new("moved", "get-url-ua")
            .param("PATH", "/a4-test/moved")
            .check(|c| {
                c.status_is(301);
                c.header_is("Location", "/a4-test/open");
                Ok(())
            }),
    ])
    .await;

    assert_eq!(report.entries[0].outcome, Outcome::Passed);
}

#[tokio::test]
async fn test_timeout_is_errored() {
    let addr = start_server(Arc::default()).await;

    let report = run(addr.port(), 200, vec![basic_auth_realm("/a4-test/slow")]).await;

    let entry = &report.entries[0];
    assert_eq!(entry.outcome, Outcome::Errored);
    assert!(entry.checks.is_empty());
    assert!(entry.message.as_deref().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_connection_refused_is_errored() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let report = run(port, 2_000, vec![basic_auth_realm("/a4-test/limited1/protected")]).await;

    let entry = &report.entries[0];
    assert_eq!(entry.outcome, Outcome::Errored);
    assert!(entry.checks.is_empty());
    assert!(
        entry
            .message
            .as_deref()
            .unwrap()
            .starts_with(TransportErrorKind::ConnectionRefused.title())
    );
}
