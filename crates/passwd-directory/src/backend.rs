//! The backend adapter interface.
//!
//! [`PasswordBackend`] is the one interface the orchestrator sees. Schema
//! variance lives entirely behind it: [`build_backend`] picks the
//! implementation from the backend's [`SchemaVariant`].

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::ad::ActiveDirectoryBackend;
use crate::config::{BackendConfig, BackendId, SchemaVariant};
use crate::error::{BackendError, BackendResult, FailureKind};
use crate::filter::render_search_filter;
use crate::session::{DirectoryConnector, DirectorySession};
use crate::standard::StandardBackend;

/// A directory backend that can change a user's password.
#[async_trait]
pub trait PasswordBackend: Send + Sync {
    /// Ordered identity of this backend.
    fn id(&self) -> &BackendId;

    /// Change `uid`'s password from `old_password` to `new_password`.
    ///
    /// Opens one connection, authenticates, resolves the user entry and
    /// submits the modification. No retries.
    async fn apply(&self, uid: &str, old_password: &str, new_password: &str)
        -> BackendResult<()>;

    /// Undo a previous [`apply`](Self::apply), restoring `old_password`.
    async fn revert(
        &self,
        uid: &str,
        new_password: &str,
        old_password: &str,
    ) -> BackendResult<()> {
        self.apply(uid, new_password, old_password).await
    }
}

/// Build the adapter for the backend at position `index`.
///
/// The configuration is validated first.
pub fn build_backend(
    index: usize,
    config: BackendConfig,
    connector: Arc<dyn DirectoryConnector>,
) -> BackendResult<Arc<dyn PasswordBackend>> {
    config.validate()?;
    let id = BackendId::for_config(index, &config);

    let backend: Arc<dyn PasswordBackend> = match config.schema {
        SchemaVariant::Standard { .. } => Arc::new(StandardBackend::new(id, config, connector)),
        SchemaVariant::ActiveDirectory { .. } => {
            Arc::new(ActiveDirectoryBackend::new(id, config, connector))
        }
    };
    Ok(backend)
}

/// Bound `fut` by `timeout`, reporting expiry as a failure of `operation`.
pub(crate) async fn timed<T, F>(operation: FailureKind, timeout: Duration, fut: F) -> BackendResult<T>
where
    F: Future<Output = BackendResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout {
            operation,
            timeout_secs: timeout.as_secs(),
        }),
    }
}

/// Open a session to the backend, bounded by the connect timeout.
pub(crate) async fn open_session(
    connector: &dyn DirectoryConnector,
    config: &BackendConfig,
) -> BackendResult<Box<dyn DirectorySession>> {
    timed(
        FailureKind::Bind,
        config.connection.connect_timeout(),
        connector.connect(config),
    )
    .await
}

/// Bind as `dn`, bounded by the operation timeout.
///
/// An empty password is refused locally: most servers treat it as an
/// unauthenticated bind that succeeds.
pub(crate) async fn bind_as(
    session: &mut dyn DirectorySession,
    config: &BackendConfig,
    dn: &str,
    password: &str,
) -> BackendResult<()> {
    if password.is_empty() {
        return Err(BackendError::InvalidCredentials);
    }
    timed(
        FailureKind::Bind,
        config.connection.operation_timeout(),
        session.bind(dn, password),
    )
    .await
}

/// Resolve the single entry matching `uid`.
///
/// Zero matches and more than one match are both failures; an ambiguous
/// result is never narrowed to its first entry.
pub(crate) async fn resolve_user_dn(
    session: &mut dyn DirectorySession,
    config: &BackendConfig,
    uid: &str,
) -> BackendResult<String> {
    let filter = render_search_filter(&config.search_filter, uid);
    let mut dns = timed(
        FailureKind::Search,
        config.connection.operation_timeout(),
        session.search_dns(&config.base_dn, &filter),
    )
    .await?;

    match dns.len() {
        0 => Err(BackendError::UserNotFound),
        1 => Ok(dns.remove(0)),
        matches => Err(BackendError::AmbiguousUser { matches }),
    }
}

/// Close a session, logging (not propagating) unbind failures.
pub(crate) async fn close_session(
    mut session: Box<dyn DirectorySession>,
    config: &BackendConfig,
    id: &BackendId,
) {
    let result = timed(
        FailureKind::Bind,
        config.connection.operation_timeout(),
        session.unbind(),
    )
    .await;
    if let Err(e) = result {
        warn!(backend = %id, error = %e, "Error during directory unbind");
    }
}
