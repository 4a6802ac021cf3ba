//! CS 531 (Web Server Design), assignment 4: HTTP authentication.

use servertester_application::{Suite, TestBinding};

const TEMPLATE: &str = "get-url-ua";
const USER_AGENT: &str = "CS 531-f18 A4 automated Checker";
const REALM: &str = r#"Basic realm="Fried Twice""#;
const STUB: &str = "Yet to be implemented!";

/// Checks for Basic and Digest protected resources.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cs531A4;

fn request(name: &str, description: &str, path: &str) -> TestBinding {
    TestBinding::new(name, TEMPLATE)
        .describe(description)
        .param("PATH", path)
        .param("USERAGENT", USER_AGENT)
}

/// A numbered placeholder test. It is reported as not implemented without
/// contacting the server; the body records the status it is meant to expect.
fn stub(number: u32, expected_status: u16) -> TestBinding {
    request(
        &format!("test_{number}"),
        &format!("Test case {number}"),
        "/a4-test/",
    )
    .pending(STUB)
    .check(move |c| {
        c.status_is(expected_status);
        Ok(())
    })
}

impl Suite for Cs531A4 {
    fn name(&self) -> &str {
        "cs531a4"
    }

    fn description(&self) -> &str {
        "Assignment 4 of CS 531: Basic and Digest access authentication"
    }

    fn bindings(&self) -> Vec<TestBinding> {
        vec![
            request(
                "test_basic_auth_realm",
                "Files are protected with HTTP Basic auth and return the configured realm",
                "/a4-test/limited1/protected",
            )
            .check(|c| {
                c.status_is(401);
                c.header_is("WWW-Authenticate", REALM);
                Ok(())
            }),
            stub(2, 200),
            request(
                "test_nested_digest_auth",
                "Files in nested directories are protected with HTTP Digest auth",
                "/a4-test/limited2/foo/bar.txt",
            )
            .check(|c| {
                c.status_is(401);
                c.header_begins("WWW-Authenticate", "Digest");
                Ok(())
            }),
            stub(4, 200),
            stub(5, 401),
            stub(6, 401),
            stub(7, 200),
            stub(8, 401),
            request(
                "test_nested_basic_auth",
                "Files in nested directories are protected with HTTP Basic auth",
                "/a4-test/limited1/1/protected2",
            )
            .check(|c| {
                c.status_is(401);
                c.header_is("WWW-Authenticate", REALM);
                Ok(())
            }),
            stub(10, 200),
            stub(11, 401),
            stub(12, 401),
            stub(13, 400),
            stub(14, 401),
            stub(15, 401),
            stub(16, 416),
            stub(17, 416),
        ]
    }
}
