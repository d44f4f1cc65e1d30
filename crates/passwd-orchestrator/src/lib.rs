//! # Password change orchestrator
//!
//! Sequences the quality check and every configured directory backend for
//! one password change, and owns rollback.
//!
//! A change either lands on every backend, or each backend that had already
//! accepted it is returned to the old password in reverse order. When a
//! rollback itself fails the result is [`ChangeStatus::Inconsistent`] and the
//! full outcome list is escalated on the `passwd::alert` tracing target.
//!
//! ```ignore
//! use std::sync::Arc;
//! use passwd_directory::LdapConnector;
//! use passwd_orchestrator::{ChangeOrchestrator, ChangeRequest};
//!
//! let orchestrator =
//!     ChangeOrchestrator::from_configs(configs, policy, Arc::new(LdapConnector::new()))?;
//! let result = orchestrator
//!     .change_password(ChangeRequest::new("jdoe", "old-secret", "N3w-secret!"))
//!     .await;
//! ```

pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod request;

pub use error::{OrchestratorError, OrchestratorResult};
pub use orchestrator::{ChangeOrchestrator, ALERT_TARGET};
pub use outcome::{
    BackendOutcome, BindFailure, ChangeResult, ChangeStatus, OutcomeStatus, ResultCategory,
    SearchFailure,
};
pub use request::ChangeRequest;
