//! Quality policy error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a [`QualityPolicy`](crate::QualityPolicy).
///
/// These are configuration errors surfaced at startup. Checking a password
/// never fails; it yields a verdict.
#[derive(Debug, Error)]
pub enum QualityError {
    /// The dictionary file could not be read.
    #[error("failed to read password dictionary {path}: {source}")]
    DictionaryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dictionary checks are enabled but no file was configured.
    #[error("dictionary_check_enabled is set but dictionary_file is missing")]
    DictionaryNotConfigured,
}

impl QualityError {
    /// Get the error code for structured reporting.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DictionaryRead { .. } => "dictionary_read",
            Self::DictionaryNotConfigured => "dictionary_not_configured",
        }
    }
}

/// Result type for quality policy construction.
pub type QualityResult<T> = Result<T, QualityError>;
