//! Servertester Domain - Core types
//!
//! This crate defines the domain model for the servertester HTTP
//! conformance harness: request templates and overrides, response
//! captures, check results and run reports.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod request;
pub mod response;
mod serde_duration;
pub mod settings;
pub mod testing;

pub use error::{DomainError, DomainResult};
pub use request::{Header, Headers, HttpMethod, RequestOverride, RequestSpec, RequestTemplate};
pub use response::{ResponseCapture, TransportError, TransportErrorKind};
pub use settings::{RunSettings, Scheme};
pub use testing::{CheckKind, CheckResult, Outcome, Report, ReportEntry, ReportSummary};
