//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the harness core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod http_client;
mod template_source;

pub use http_client::{
    CancellationReceiver, CancellationToken, HttpClient, HttpClientError, OutboundRequest,
};
pub use template_source::{TemplateSource, TemplateSourceError};
