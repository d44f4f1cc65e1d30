//! Per-backend outcomes and the aggregated change result.

use passwd_directory::{BackendError, BackendId, FailureKind};
use passwd_quality::PasswordViolation;
use serde::Serialize;

/// Why a bind step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindFailure {
    /// The directory rejected the supplied current password.
    InvalidCredentials,
    /// The directory answered the bind with a non-credential error.
    Refused,
    /// The directory could not be reached.
    Transport,
    Timeout,
}

/// Why a search step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchFailure {
    NotFound,
    Ambiguous { matches: usize },
    Error,
}

/// What happened to one backend during a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The new password is in place.
    Success,
    /// The new password was applied and later rolled back.
    Reverted,
    BindFailed(BindFailure),
    SearchFailed(SearchFailure),
    ModifyFailed,
    /// The new password was applied but could not be rolled back.
    RollbackFailed(FailureKind),
    /// The backend was never contacted.
    NotAttempted,
    /// The change was aborted and the backend's state is unknown.
    Unknown,
}

impl OutcomeStatus {
    /// Classify a forward-pass failure.
    #[must_use]
    pub fn from_error(error: &BackendError) -> Self {
        match error {
            BackendError::InvalidCredentials => Self::BindFailed(BindFailure::InvalidCredentials),
            BackendError::Bind { .. } | BackendError::InvalidConfiguration { .. } => {
                Self::BindFailed(BindFailure::Refused)
            }
            BackendError::Connect { .. } => Self::BindFailed(BindFailure::Transport),
            BackendError::UserNotFound => Self::SearchFailed(SearchFailure::NotFound),
            BackendError::AmbiguousUser { matches } => {
                Self::SearchFailed(SearchFailure::Ambiguous { matches: *matches })
            }
            BackendError::Timeout { operation, .. } => match operation {
                FailureKind::Bind => Self::BindFailed(BindFailure::Timeout),
                FailureKind::Search => Self::SearchFailed(SearchFailure::Error),
                FailureKind::Modify => Self::ModifyFailed,
            },
            BackendError::Search { .. } => Self::SearchFailed(SearchFailure::Error),
            BackendError::Modify { .. } | BackendError::Encoding { .. } => Self::ModifyFailed,
        }
    }

    /// Whether this status is a forward-pass failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::BindFailed(_) | Self::SearchFailed(_) | Self::ModifyFailed
        )
    }

    /// Whether the backend may hold a password other than the user's old one
    /// without the system knowing it.
    #[must_use]
    pub fn needs_operator(&self) -> bool {
        matches!(self, Self::RollbackFailed(_) | Self::Unknown)
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Reverted => write!(f, "reverted"),
            Self::BindFailed(reason) => write!(f, "bind_failed({reason:?})"),
            Self::SearchFailed(reason) => write!(f, "search_failed({reason:?})"),
            Self::ModifyFailed => write!(f, "modify_failed"),
            Self::RollbackFailed(kind) => write!(f, "rollback_failed({kind})"),
            Self::NotAttempted => write!(f, "not_attempted"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Outcome for one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendOutcome {
    pub backend: BackendId,
    pub status: OutcomeStatus,
    /// Operator-only diagnostic text. May contain DNs or raw directory
    /// messages, so it is never serialized.
    #[serde(skip)]
    pub detail: Option<String>,
}

impl BackendOutcome {
    #[must_use]
    pub fn new(backend: BackendId, status: OutcomeStatus) -> Self {
        Self {
            backend,
            status,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Overall tag of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Success,
    /// The new password failed the quality policy; no backend was contacted.
    ValidationFailed,
    /// A backend failed and every earlier backend was restored.
    PartialFailureRolledBack,
    /// A rollback failed. Operator intervention is required.
    Inconsistent,
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::PartialFailureRolledBack => write!(f, "partial_failure_rolled_back"),
            Self::Inconsistent => write!(f, "inconsistent"),
        }
    }
}

/// Generic category a front-end may show to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCategory {
    Success,
    BadOldPassword,
    PolicyViolation,
    SystemError,
}

/// Aggregated result of one password change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeResult {
    pub status: ChangeStatus,
    /// Violated quality rules; only set for [`ChangeStatus::ValidationFailed`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<PasswordViolation>,
    /// One outcome per configured backend, in configured order.
    pub outcomes: Vec<BackendOutcome>,
}

impl ChangeResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ChangeStatus::Success
    }

    /// The forward-pass failure that stopped the change, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&BackendOutcome> {
        self.outcomes.iter().find(|o| o.status.is_failure())
    }

    /// Backends that need manual reconciliation.
    pub fn unresolved(&self) -> impl Iterator<Item = &BackendOutcome> {
        self.outcomes.iter().filter(|o| o.status.needs_operator())
    }

    /// Map to the category shown to end users.
    ///
    /// A rejected current password is only reported as such when every
    /// changed backend was restored; anything else is a generic system error.
    #[must_use]
    pub fn category(&self) -> ResultCategory {
        match self.status {
            ChangeStatus::Success => ResultCategory::Success,
            ChangeStatus::ValidationFailed => ResultCategory::PolicyViolation,
            ChangeStatus::PartialFailureRolledBack => match self.failure().map(|o| o.status) {
                Some(OutcomeStatus::BindFailed(BindFailure::InvalidCredentials)) => {
                    ResultCategory::BadOldPassword
                }
                _ => ResultCategory::SystemError,
            },
            ChangeStatus::Inconsistent => ResultCategory::SystemError,
        }
    }
}
