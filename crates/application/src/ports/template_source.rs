//! Template source port

use async_trait::async_trait;
use servertester_domain::RequestTemplate;
use thiserror::Error;

/// Errors a [`TemplateSource`] can report.
#[derive(Debug, Error)]
pub enum TemplateSourceError {
    /// The underlying storage could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored template could not be parsed.
    #[error("failed to parse {name}: {reason}")]
    Parse {
        /// Resource that failed.
        name: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Port for loading request templates from external storage.
///
/// The storage format is the adapter's concern; the harness only needs the
/// resulting templates, loaded once before any test is registered.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Loads every template this source provides.
    async fn load_all(&self) -> Result<Vec<RequestTemplate>, TemplateSourceError>;
}
