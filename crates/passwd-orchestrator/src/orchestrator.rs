//! The change orchestrator.
//!
//! One pass is an explicit state machine:
//!
//! - `Validating` -> `Done(ValidationFailed)` or `Applying { 0 }`
//! - `Applying { i }` -> `Applying { i + 1 }`, `Done(Success)` after the
//!   last backend, or `RollingBack` on the first failure
//! - `RollingBack { pending }` reverts backend `pending - 1`, then moves to
//!   `pending - 1`; at zero it ends in `Done(PartialFailureRolledBack)` or
//!   `Done(Inconsistent)`
//!
//! Backends are applied strictly in configured order and reverted strictly
//! in reverse, so the rollback set is always a prefix of the configured list.

use std::sync::Arc;

use passwd_directory::{build_backend, BackendConfig, BackendId, DirectoryConnector, PasswordBackend};
use passwd_quality::{check, QualityPolicy, QualityVerdict};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::outcome::{BackendOutcome, ChangeResult, ChangeStatus, OutcomeStatus};
use crate::request::ChangeRequest;

/// Tracing target for results that need operator attention.
pub const ALERT_TARGET: &str = "passwd::alert";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeState {
    Validating,
    Applying { index: usize },
    /// Backends `0..pending` still have to be reverted.
    RollingBack { failed_at: usize, pending: usize },
    Done(ChangeStatus),
}

struct Inner {
    backends: Vec<Arc<dyn PasswordBackend>>,
    policy: Option<Arc<QualityPolicy>>,
}

/// Applies a password change across every configured backend, or none.
///
/// Cheap to clone; clones share the same read-only backends and policy,
/// and the same set of in-flight passes.
#[derive(Clone)]
pub struct ChangeOrchestrator {
    inner: Arc<Inner>,
    tracker: TaskTracker,
}

impl ChangeOrchestrator {
    /// Create an orchestrator over already-built backends, in processing order.
    pub fn new(
        backends: Vec<Arc<dyn PasswordBackend>>,
        policy: Option<Arc<QualityPolicy>>,
    ) -> OrchestratorResult<Self> {
        if backends.is_empty() {
            return Err(OrchestratorError::NoBackends);
        }
        Ok(Self {
            inner: Arc::new(Inner { backends, policy }),
            tracker: TaskTracker::new(),
        })
    }

    /// Validate `configs` and build one adapter per entry.
    pub fn from_configs(
        configs: Vec<BackendConfig>,
        policy: Option<Arc<QualityPolicy>>,
        connector: Arc<dyn DirectoryConnector>,
    ) -> OrchestratorResult<Self> {
        let backends = configs
            .into_iter()
            .enumerate()
            .map(|(index, config)| {
                build_backend(index, config, Arc::clone(&connector))
                    .map_err(|source| OrchestratorError::InvalidBackend { index, source })
            })
            .collect::<OrchestratorResult<Vec<_>>>()?;
        Self::new(backends, policy)
    }

    #[must_use]
    pub fn backend_count(&self) -> usize {
        self.inner.backends.len()
    }

    #[must_use]
    pub fn backend_ids(&self) -> Vec<BackendId> {
        self.inner.backends.iter().map(|b| b.id().clone()).collect()
    }

    #[must_use]
    pub fn policy(&self) -> Option<&QualityPolicy> {
        self.inner.policy.as_deref()
    }

    /// Number of passes still running, including ones whose caller left.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Change the user's password on every backend.
    ///
    /// The pass runs on its own tracked task: if the caller stops waiting,
    /// forward application and any rollback still run to completion, and
    /// [`ChangeOrchestrator::shutdown`] waits for them.
    pub async fn change_password(&self, request: ChangeRequest) -> ChangeResult {
        let inner = Arc::clone(&self.inner);
        let uid = request.uid().to_string();

        match self.tracker.spawn(async move { inner.run(request).await }).await {
            Ok(result) => result,
            Err(join_error) => {
                error!(
                    target: ALERT_TARGET,
                    uid = %uid,
                    error = %join_error,
                    "Password change aborted, directory state unknown"
                );
                ChangeResult {
                    status: ChangeStatus::Inconsistent,
                    violations: Vec::new(),
                    outcomes: self
                        .backend_ids()
                        .into_iter()
                        .map(|id| BackendOutcome::new(id, OutcomeStatus::Unknown))
                        .collect(),
                }
            }
        }
    }

    /// Wait for every in-flight pass, rollback included, to finish.
    ///
    /// Call once the front-end has stopped taking requests. The runtime must
    /// not be dropped before this returns.
    pub async fn shutdown(&self) {
        self.tracker.close();
        let in_flight = self.tracker.len();
        if in_flight > 0 {
            info!(in_flight, "Waiting for in-flight password changes");
        }
        self.tracker.wait().await;
        debug!("All password changes finished");
    }
}

impl Inner {
    #[instrument(skip(self, request), fields(uid = %request.uid()))]
    async fn run(&self, request: ChangeRequest) -> ChangeResult {
        let uid = request.uid();
        let mut outcomes: Vec<BackendOutcome> = self
            .backends
            .iter()
            .map(|b| BackendOutcome::new(b.id().clone(), OutcomeStatus::NotAttempted))
            .collect();
        let mut violations = Vec::new();
        let mut state = ChangeState::Validating;

        let status = loop {
            debug!(state = ?state, "Password change state");
            state = match state {
                ChangeState::Validating => {
                    match check(request.new_password(), self.policy.as_deref()) {
                        QualityVerdict::Pass => ChangeState::Applying { index: 0 },
                        QualityVerdict::Fail(failed) => {
                            violations = failed;
                            ChangeState::Done(ChangeStatus::ValidationFailed)
                        }
                    }
                }
                ChangeState::Applying { index } if index == self.backends.len() => {
                    ChangeState::Done(ChangeStatus::Success)
                }
                ChangeState::Applying { index } => {
                    let backend = &self.backends[index];
                    match backend
                        .apply(uid, request.old_password(), request.new_password())
                        .await
                    {
                        Ok(()) => {
                            outcomes[index].status = OutcomeStatus::Success;
                            ChangeState::Applying { index: index + 1 }
                        }
                        Err(e) => {
                            let status = OutcomeStatus::from_error(&e);
                            warn!(
                                backend = %backend.id(),
                                status = %status,
                                error_code = e.error_code(),
                                "Password change failed on backend"
                            );
                            outcomes[index] =
                                BackendOutcome::new(backend.id().clone(), status)
                                    .with_detail(e.to_string());
                            ChangeState::RollingBack {
                                failed_at: index,
                                pending: index,
                            }
                        }
                    }
                }
                ChangeState::RollingBack { pending: 0, .. } => {
                    if outcomes.iter().any(|o| o.status.needs_operator()) {
                        ChangeState::Done(ChangeStatus::Inconsistent)
                    } else {
                        ChangeState::Done(ChangeStatus::PartialFailureRolledBack)
                    }
                }
                ChangeState::RollingBack { failed_at, pending } => {
                    let index = pending - 1;
                    let backend = &self.backends[index];
                    match backend
                        .revert(uid, request.new_password(), request.old_password())
                        .await
                    {
                        Ok(()) => {
                            info!(
                                backend = %backend.id(),
                                failed_backend = failed_at,
                                "Reverted password change"
                            );
                            outcomes[index].status = OutcomeStatus::Reverted;
                        }
                        Err(e) => {
                            // Keep going: the remaining backends can still be restored.
                            error!(
                                backend = %backend.id(),
                                failed_backend = failed_at,
                                error_code = e.error_code(),
                                "Rollback failed"
                            );
                            outcomes[index] = BackendOutcome::new(
                                backend.id().clone(),
                                OutcomeStatus::RollbackFailed(e.kind()),
                            )
                            .with_detail(e.to_string());
                        }
                    }
                    ChangeState::RollingBack {
                        failed_at,
                        pending: index,
                    }
                }
                ChangeState::Done(status) => break status,
            };
        };

        let result = ChangeResult {
            status,
            violations,
            outcomes,
        };
        report(uid, &result);
        result
    }
}

fn report(uid: &str, result: &ChangeResult) {
    match result.status {
        ChangeStatus::Success => {
            info!(uid = %uid, backends = result.outcomes.len(), "Password changed");
        }
        ChangeStatus::ValidationFailed => {
            warn!(
                uid = %uid,
                status = %result.status,
                violations = result.violations.len(),
                "Password rejected by quality policy"
            );
        }
        ChangeStatus::PartialFailureRolledBack => {
            warn!(uid = %uid, status = %result.status, "Unsuccessful password change attempt");
        }
        ChangeStatus::Inconsistent => {
            for outcome in &result.outcomes {
                error!(
                    target: ALERT_TARGET,
                    uid = %uid,
                    backend = %outcome.backend,
                    status = %outcome.status,
                    detail = outcome.detail.as_deref().unwrap_or(""),
                    "Backend outcome"
                );
            }
            error!(
                target: ALERT_TARGET,
                uid = %uid,
                unresolved = result.unresolved().count(),
                "Password change left directories inconsistent, manual reconciliation required"
            );
        }
    }
}
