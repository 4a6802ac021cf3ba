//! Response capture type

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::request::Headers;

/// Category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The server actively refused the connection.
    ConnectionRefused,
    /// The host name could not be resolved.
    Dns,
    /// Any other connection-level failure.
    Connection,
    /// The request could not be built (bad URL, bad header).
    InvalidRequest,
    /// Something else went wrong while sending or reading.
    Other,
}

impl TransportErrorKind {
    /// Short human-readable title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Timeout => "Request timed out",
            Self::ConnectionRefused => "Connection refused",
            Self::Dns => "DNS resolution failed",
            Self::Connection => "Connection failed",
            Self::InvalidRequest => "Invalid request",
            Self::Other => "Transport error",
        }
    }
}

/// A network-level failure observed while dispatching a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportError {
    /// What kind of failure this was.
    pub kind: TransportErrorKind,
    /// Detail from the HTTP client.
    pub message: String,
}

impl TransportError {
    /// Creates a transport error.
    #[must_use]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.title(), self.message)
    }
}

/// What came back for one dispatched request.
///
/// Either a response (status, headers, body) or a transport failure, never
/// both: a capture with `transport_error` set has no status and no headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseCapture {
    /// HTTP status code, absent on transport failure
    pub status: Option<u16>,
    /// Response headers in received order
    pub headers: Headers,
    /// Raw response body
    pub body: Vec<u8>,
    /// Time from send to fully read body (or to the failure)
    #[serde(with = "crate::serde_duration")]
    pub duration: Duration,
    /// Set when no response was obtained
    pub transport_error: Option<TransportError>,
}

impl ResponseCapture {
    /// Creates a capture for a received response.
    #[must_use]
    pub const fn received(
        status: u16,
        headers: Headers,
        body: Vec<u8>,
        duration: Duration,
    ) -> Self {
        Self {
            status: Some(status),
            headers,
            body,
            duration,
            transport_error: None,
        }
    }

    /// Creates a capture for a request that never produced a response.
    #[must_use]
    pub const fn failed(error: TransportError, duration: Duration) -> Self {
        Self {
            status: None,
            headers: Headers::new(),
            body: Vec::new(),
            duration,
            transport_error: Some(error),
        }
    }

    /// Returns true if the request failed at the transport level.
    #[must_use]
    pub const fn is_transport_error(&self) -> bool {
        self.transport_error.is_some()
    }

    /// Returns the first value of a header, ignoring name case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Returns every value of a header, ignoring name case.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers.get_all(name)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_received_capture() {
        let headers: Headers = [("WWW-Authenticate", "Basic realm=\"Fried Twice\"")]
            .into_iter()
            .collect();
        let capture =
            ResponseCapture::received(401, headers, b"denied".to_vec(), Duration::from_millis(3));

        assert!(!capture.is_transport_error());
        assert_eq!(capture.status, Some(401));
        assert_eq!(
            capture.header("www-authenticate"),
            Some("Basic realm=\"Fried Twice\"")
        );
        assert_eq!(capture.body_text(), "denied");
    }

    #[test]
    fn test_failed_capture_has_no_response_data() {
        let capture = ResponseCapture::failed(
            TransportError::new(TransportErrorKind::ConnectionRefused, "127.0.0.1:1"),
            Duration::ZERO,
        );

        assert!(capture.is_transport_error());
        assert_eq!(capture.status, None);
        assert!(capture.headers.is_empty());
        assert!(capture.body.is_empty());
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::new(TransportErrorKind::Timeout, "after 10000ms");
        assert_eq!(err.to_string(), "Request timed out: after 10000ms");
    }
}
