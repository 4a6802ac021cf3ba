//! Application error types

use servertester_domain::DomainError;
use thiserror::Error;

/// Application-level errors.
///
/// These are setup errors: anything that goes wrong while a single test
/// case runs is recorded in its report entry instead.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A test binding referenced a template that is not loaded.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Two bindings in the same registry share a name.
    #[error("duplicate test name: {0}")]
    DuplicateTest(String),

    /// Templates could not be loaded from their source.
    #[error("template source error: {0}")]
    TemplateSource(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
