//! Standard LDAP backend.
//!
//! Flow: connect, optionally bind with the search account, resolve the
//! user's DN, bind as the user with the current password, then submit the
//! modification while still bound as the user.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::backend::{
    bind_as, close_session, open_session, resolve_user_dn, timed, PasswordBackend,
};
use crate::config::{BackendConfig, BackendId, SchemaVariant, StandardPasswordChange};
use crate::error::{BackendError, BackendResult, FailureKind};
use crate::modification::PasswordModification;
use crate::session::{DirectoryConnector, DirectorySession};

/// Build the modification for a standard LDAP backend.
pub fn standard_modification(
    change: StandardPasswordChange,
    attribute: &str,
    old_password: &str,
    new_password: &str,
) -> BackendResult<PasswordModification> {
    if new_password.is_empty() {
        return Err(BackendError::Encoding {
            message: "password cannot be empty".to_string(),
        });
    }
    match change {
        StandardPasswordChange::Replace => Ok(PasswordModification::Replace {
            attribute: attribute.to_string(),
            value: new_password.as_bytes().to_vec(),
        }),
        StandardPasswordChange::ExtendedOperation => Ok(PasswordModification::ExtendedOperation {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        }),
    }
}

/// Backend adapter for standard LDAP directories.
pub struct StandardBackend {
    id: BackendId,
    config: BackendConfig,
    connector: Arc<dyn DirectoryConnector>,
}

impl StandardBackend {
    /// Create a standard backend. The configuration must already be validated.
    pub fn new(id: BackendId, config: BackendConfig, connector: Arc<dyn DirectoryConnector>) -> Self {
        Self {
            id,
            config,
            connector,
        }
    }

    fn password_change(&self) -> (StandardPasswordChange, &str) {
        match &self.config.schema {
            SchemaVariant::Standard {
                password_change,
                password_attribute,
            } => (*password_change, password_attribute.as_str()),
            SchemaVariant::ActiveDirectory { .. } => {
                (StandardPasswordChange::default(), "userPassword")
            }
        }
    }

    async fn change_in_session(
        &self,
        session: &mut dyn DirectorySession,
        uid: &str,
        old_password: &str,
        modification: &PasswordModification,
    ) -> BackendResult<()> {
        if let Some(search_dn) = &self.config.search_bind_dn {
            let search_password = self.config.search_bind_password.as_deref().unwrap_or("");
            // A rejected service account is a configuration problem, not a wrong user password.
            bind_as(session, &self.config, search_dn, search_password)
                .await
                .map_err(|e| match e {
                    BackendError::InvalidCredentials => BackendError::Bind {
                        code: 49,
                        message: "search account credentials rejected".to_string(),
                    },
                    other => other,
                })?;
        }

        let user_dn = resolve_user_dn(session, &self.config, uid).await?;
        debug!(backend = %self.id, dn = %user_dn, "Resolved user entry");

        bind_as(session, &self.config, &user_dn, old_password).await?;

        timed(
            FailureKind::Modify,
            self.config.connection.operation_timeout(),
            session.modify_password(&user_dn, modification),
        )
        .await
    }
}

#[async_trait]
impl PasswordBackend for StandardBackend {
    fn id(&self) -> &BackendId {
        &self.id
    }

    #[instrument(skip(self, old_password, new_password), fields(backend = %self.id))]
    async fn apply(&self, uid: &str, old_password: &str, new_password: &str) -> BackendResult<()> {
        let (change, attribute) = self.password_change();
        let modification = standard_modification(change, attribute, old_password, new_password)?;

        let mut session = open_session(self.connector.as_ref(), &self.config).await?;
        let result = self
            .change_in_session(session.as_mut(), uid, old_password, &modification)
            .await;
        close_session(session, &self.config, &self.id).await;

        if result.is_ok() {
            info!(
                backend = %self.id,
                uid = %uid,
                operation = modification.operation_name(),
                "Password changed in directory"
            );
        }
        result
    }
}
