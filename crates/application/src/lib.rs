//! Servertester Application - Harness core
//!
//! This crate holds the parts of the harness that decide what to send and
//! what the answer means: the template store, test registry, dispatcher,
//! assertion library and suite runner. I/O goes through the ports defined
//! here and implemented by the infrastructure layer.

pub mod checks;
pub mod dispatcher;
pub mod error;
pub mod placeholder;
pub mod ports;
pub mod registry;
pub mod runner;
pub mod template_store;

pub use checks::{BodyResult, Checks, TestFailure, not_implemented, require};
pub use dispatcher::{Dispatcher, merge};
pub use error::{ApplicationError, ApplicationResult};
pub use ports::{
    CancellationReceiver, CancellationToken, HttpClient, HttpClientError, OutboundRequest,
    TemplateSource, TemplateSourceError,
};
pub use registry::{Suite, TestBinding, TestBody, TestCase, TestRegistry};
pub use runner::SuiteRunner;
pub use template_store::TemplateStore;
