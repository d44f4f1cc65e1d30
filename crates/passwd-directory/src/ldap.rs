//! `ldap3`-backed directory sessions.

use async_trait::async_trait;
use ldap3::exop::PasswordModify;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapResult, Mod, Scope, SearchEntry};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};
use crate::modification::PasswordModification;
use crate::session::{DirectoryConnector, DirectorySession};

/// LDAP result code for invalidCredentials.
const RC_INVALID_CREDENTIALS: u32 = 49;

/// Opens real LDAP connections with `ldap3`.
#[derive(Debug, Clone, Default)]
pub struct LdapConnector;

impl LdapConnector {
    /// Create a new connector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DirectoryConnector for LdapConnector {
    #[instrument(skip(self, config), fields(host = %config.host, port = config.port()))]
    async fn connect(&self, config: &BackendConfig) -> BackendResult<Box<dyn DirectorySession>> {
        let url = config.url();

        debug!(url = %url, "Connecting to directory server");

        let settings = LdapConnSettings::new()
            .set_conn_timeout(config.connection.connect_timeout())
            .set_starttls(config.use_starttls)
            .set_no_tls_verify(!config.verify_certificate);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| {
                BackendError::connect_with_source(
                    format!("failed to connect to directory server at {url}"),
                    e,
                )
            })?;

        // Spawn the connection driver
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        Ok(Box::new(LdapSession { ldap }))
    }
}

/// One open `ldap3` connection.
pub struct LdapSession {
    ldap: Ldap,
}

#[async_trait]
impl DirectorySession for LdapSession {
    async fn bind(&mut self, dn: &str, password: &str) -> BackendResult<()> {
        let result = self
            .ldap
            .simple_bind(dn, password)
            .await
            .map_err(|e| BackendError::connect_with_source("bind request failed", e))?;

        match result.rc {
            0 => Ok(()),
            RC_INVALID_CREDENTIALS => Err(BackendError::InvalidCredentials),
            code => Err(BackendError::Bind {
                code,
                message: result.text,
            }),
        }
    }

    async fn search_dns(&mut self, base_dn: &str, filter: &str) -> BackendResult<Vec<String>> {
        let result = self
            .ldap
            .search(base_dn, Scope::Subtree, filter, vec!["1.1"])
            .await
            .map_err(|e| BackendError::search_with_source("search request failed", e))?;

        let (entries, _res) = result
            .success()
            .map_err(|e| BackendError::search_with_source("search returned an error", e))?;

        Ok(entries
            .into_iter()
            .map(|entry| SearchEntry::construct(entry).dn)
            .collect())
    }

    async fn modify_password(
        &mut self,
        dn: &str,
        modification: &PasswordModification,
    ) -> BackendResult<()> {
        let result = match modification {
            PasswordModification::Replace { attribute, value } => {
                let mods = vec![Mod::Replace(
                    attribute.as_bytes().to_vec(),
                    HashSet::from([value.clone()]),
                )];
                self.ldap.modify(dn, mods).await
            }
            PasswordModification::DeleteAdd {
                attribute,
                old_value,
                new_value,
            } => {
                let mods = vec![
                    Mod::Delete(
                        attribute.as_bytes().to_vec(),
                        HashSet::from([old_value.clone()]),
                    ),
                    Mod::Add(
                        attribute.as_bytes().to_vec(),
                        HashSet::from([new_value.clone()]),
                    ),
                ];
                self.ldap.modify(dn, mods).await
            }
            PasswordModification::ExtendedOperation {
                old_password,
                new_password,
            } => {
                let exop = PasswordModify {
                    user_id: Some(dn),
                    old_pass: Some(old_password.as_str()),
                    new_pass: Some(new_password.as_str()),
                };
                self.ldap.extended(exop).await.map(|res| res.1)
            }
        };

        let result = result.map_err(|e| BackendError::Modify {
            code: 0,
            message: format!("modify request failed: {e}"),
        })?;

        check_modify_result(result)
    }

    async fn unbind(&mut self) -> BackendResult<()> {
        self.ldap
            .unbind()
            .await
            .map_err(|e| BackendError::connect_with_source("unbind failed", e))
    }
}

fn check_modify_result(result: LdapResult) -> BackendResult<()> {
    if result.rc == 0 {
        return Ok(());
    }
    Err(BackendError::Modify {
        code: result.rc,
        message: constraint_message(&result.text),
    })
}

/// Extract the useful part of a constraint-violation diagnostic.
///
/// Samba 4 and AD prefix the reason with `check_password_restrictions: `.
fn constraint_message(text: &str) -> String {
    text.rsplit("check_password_restrictions: ")
        .next()
        .unwrap_or(text)
        .trim()
        .to_string()
}
