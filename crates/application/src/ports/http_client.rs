//! HTTP Client port

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use servertester_domain::{RequestSpec, ResponseCapture, TransportError, TransportErrorKind};
use thiserror::Error;
use tokio::sync::watch;
use url::Url;

/// Errors an [`HttpClient`] reports when no response was obtained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// The request timed out.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// The server refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// DNS lookup failed.
    #[error("could not resolve {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Client detail.
        message: String,
    },

    /// Some other connection problem.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A header could not be sent as given.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl HttpClientError {
    /// Maps this error onto the transport error recorded in a capture.
    #[must_use]
    pub fn to_transport_error(&self) -> TransportError {
        let kind = match self {
            Self::Timeout { .. } => TransportErrorKind::Timeout,
            Self::ConnectionRefused { .. } => TransportErrorKind::ConnectionRefused,
            Self::DnsError { .. } => TransportErrorKind::Dns,
            Self::ConnectionFailed(_) => TransportErrorKind::Connection,
            Self::InvalidHeader(_) => TransportErrorKind::InvalidRequest,
            Self::Other(_) => TransportErrorKind::Other,
        };
        TransportError::new(kind, self.to_string())
    }
}

/// A request as handed to an [`HttpClient`]: absolute URL plus the spec.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// Absolute URL, built from the base URL and the request target.
    pub url: Url,
    /// The materialized request.
    pub spec: RequestSpec,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Port for sending HTTP requests.
///
/// Implementations send exactly one request, never retry, and never follow
/// redirects, so the capture reflects what the server actually said.
pub trait HttpClient: Send + Sync {
    /// Sends the request and returns the captured response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was obtained (timeout, refused
    /// connection, DNS failure, malformed request).
    fn execute(
        &self,
        request: &OutboundRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ResponseCapture, HttpClientError>> + Send + '_>>;
}

/// Handle used to cancel a run between test cases.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: watch::Sender<bool>,
}

/// Receiving side of a [`CancellationToken`].
#[derive(Debug, Clone)]
pub struct CancellationReceiver {
    receiver: watch::Receiver<bool>,
}

impl CancellationToken {
    /// Creates a token and its receiver.
    #[must_use]
    pub fn new() -> (Self, CancellationReceiver) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, CancellationReceiver { receiver })
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl CancellationReceiver {
    /// A receiver that is never cancelled.
    #[must_use]
    pub fn never() -> Self {
        let (_, receiver) = CancellationToken::new();
        receiver
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }
}
