//! Orchestrator construction errors.

use passwd_directory::BackendError;
use thiserror::Error;

/// Errors raised while building a [`ChangeOrchestrator`](crate::ChangeOrchestrator).
///
/// A password change itself never fails with an error; it returns a
/// [`ChangeResult`](crate::ChangeResult).
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No backend was configured.
    #[error("at least one backend must be configured")]
    NoBackends,

    /// A backend definition failed validation.
    #[error("invalid configuration for backend #{index}: {source}")]
    InvalidBackend {
        index: usize,
        #[source]
        source: BackendError,
    },
}

impl OrchestratorError {
    /// Get the error code for structured reporting.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoBackends => "no_backends",
            Self::InvalidBackend { .. } => "invalid_backend",
        }
    }
}

/// Result type for orchestrator construction.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
