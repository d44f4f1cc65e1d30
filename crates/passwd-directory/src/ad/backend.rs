//! Active Directory backend.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::password::{ad_modification, ad_principal};
use crate::backend::{
    bind_as, close_session, open_session, resolve_user_dn, timed, PasswordBackend,
};
use crate::config::{AdPasswordChange, BackendConfig, BackendId, SchemaVariant};
use crate::error::{BackendResult, FailureKind};
use crate::modification::PasswordModification;
use crate::session::{DirectoryConnector, DirectorySession};

/// Backend adapter for Active Directory style directories.
///
/// The user binds as `uid@domain` with the current password; the entry is
/// then resolved under that identity and `unicodePwd` is modified.
pub struct ActiveDirectoryBackend {
    id: BackendId,
    config: BackendConfig,
    connector: Arc<dyn DirectoryConnector>,
}

impl ActiveDirectoryBackend {
    /// Create an AD backend. The configuration must already be validated.
    pub fn new(id: BackendId, config: BackendConfig, connector: Arc<dyn DirectoryConnector>) -> Self {
        Self {
            id,
            config,
            connector,
        }
    }

    fn schema(&self) -> (&str, AdPasswordChange) {
        match &self.config.schema {
            SchemaVariant::ActiveDirectory {
                domain,
                password_change,
            } => (domain.as_str(), *password_change),
            SchemaVariant::Standard { .. } => ("", AdPasswordChange::default()),
        }
    }

    async fn change_in_session(
        &self,
        session: &mut dyn DirectorySession,
        principal: &str,
        uid: &str,
        old_password: &str,
        modification: &PasswordModification,
    ) -> BackendResult<()> {
        bind_as(session, &self.config, principal, old_password).await?;

        let user_dn = resolve_user_dn(session, &self.config, uid).await?;
        debug!(backend = %self.id, dn = %user_dn, "Resolved user entry");

        timed(
            FailureKind::Modify,
            self.config.connection.operation_timeout(),
            session.modify_password(&user_dn, modification),
        )
        .await
    }
}

#[async_trait]
impl PasswordBackend for ActiveDirectoryBackend {
    fn id(&self) -> &BackendId {
        &self.id
    }

    #[instrument(skip(self, old_password, new_password), fields(backend = %self.id))]
    async fn apply(&self, uid: &str, old_password: &str, new_password: &str) -> BackendResult<()> {
        let (domain, mode) = self.schema();
        let principal = ad_principal(uid, domain);
        let modification = ad_modification(mode, old_password, new_password)?;

        let mut session = open_session(self.connector.as_ref(), &self.config).await?;
        let result = self
            .change_in_session(session.as_mut(), &principal, uid, old_password, &modification)
            .await;
        close_session(session, &self.config, &self.id).await;

        if result.is_ok() {
            info!(
                backend = %self.id,
                principal = %principal,
                operation = modification.operation_name(),
                "AD password changed"
            );
        }
        result
    }
}
