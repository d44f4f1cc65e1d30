//! Backend adapter error types
//!
//! Every failure an adapter can report is classified into the step that
//! produced it (bind, search or modify), which is what drives the
//! orchestrator's outcome tags.

use thiserror::Error;

/// The adapter step a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connecting or authenticating to the directory.
    Bind,
    /// Resolving the user's entry.
    Search,
    /// Applying the password modification.
    Modify,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bind => write!(f, "bind"),
            Self::Search => write!(f, "search"),
            Self::Modify => write!(f, "modify"),
        }
    }
}

/// Error that can occur while applying a password change to one backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure opening the connection (DNS, TCP, TLS).
    #[error("connection failed: {message}")]
    Connect {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A network step did not complete within its timeout.
    #[error("{operation} timed out after {timeout_secs} seconds")]
    Timeout {
        operation: FailureKind,
        timeout_secs: u64,
    },

    /// The directory rejected the supplied credentials (result code 49).
    #[error("authentication failed: invalid credentials")]
    InvalidCredentials,

    /// Bind failed for a reason other than bad credentials.
    #[error("bind failed with code {code}: {message}")]
    Bind { code: u32, message: String },

    /// The search filter matched no entry.
    #[error("user entry not found")]
    UserNotFound,

    /// The search filter matched more than one entry.
    #[error("search matched {matches} entries, expected exactly one")]
    AmbiguousUser { matches: usize },

    /// The search itself failed.
    #[error("search failed: {message}")]
    Search {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The directory refused the modification (authorization, schema, constraint).
    #[error("modify failed with code {code}: {message}")]
    Modify { code: u32, message: String },

    /// The password could not be encoded for the target schema.
    #[error("password encoding failed: {message}")]
    Encoding { message: String },

    /// Backend configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl BackendError {
    /// The adapter step this error belongs to.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Connect { .. }
            | Self::InvalidCredentials
            | Self::Bind { .. }
            | Self::InvalidConfiguration { .. } => FailureKind::Bind,
            Self::Timeout { operation, .. } => *operation,
            Self::UserNotFound | Self::AmbiguousUser { .. } | Self::Search { .. } => {
                FailureKind::Search
            }
            Self::Modify { .. } | Self::Encoding { .. } => FailureKind::Modify,
        }
    }

    /// Whether the directory itself rejected the supplied current password.
    ///
    /// This is distinct from a transport failure: the backend was reachable
    /// and answered, but the old password did not authenticate.
    #[must_use]
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self, Self::InvalidCredentials)
    }

    /// Whether the error is a transport problem rather than a directory answer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Timeout { .. })
    }

    /// Get an error code for classification.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "CONNECTION_FAILED",
            Self::Timeout { .. } => "TIMEOUT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Bind { .. } => "BIND_FAILED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::AmbiguousUser { .. } => "AMBIGUOUS_USER",
            Self::Search { .. } => "SEARCH_FAILED",
            Self::Modify { .. } => "MODIFY_FAILED",
            Self::Encoding { .. } => "ENCODING_FAILED",
            Self::InvalidConfiguration { .. } => "INVALID_CONFIG",
        }
    }

    // Convenience constructors

    /// Create a connection error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source.
    pub fn connect_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connect {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a search error.
    pub fn search(message: impl Into<String>) -> Self {
        Self::Search {
            message: message.into(),
            source: None,
        }
    }

    /// Create a search error with source.
    pub fn search_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Search {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Result type for backend adapter operations.
pub type BackendResult<T> = Result<T, BackendError>;
