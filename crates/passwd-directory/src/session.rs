//! Directory protocol seam.
//!
//! Backends never talk to `ldap3` directly; they drive a [`DirectorySession`]
//! obtained from a [`DirectoryConnector`]. The production connector is
//! [`crate::ldap::LdapConnector`].

use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::error::BackendResult;
use crate::modification::PasswordModification;

/// An open connection to one directory server.
#[async_trait]
pub trait DirectorySession: Send {
    /// Simple bind as `dn`.
    ///
    /// Returns [`crate::BackendError::InvalidCredentials`] when the server
    /// rejects the password.
    async fn bind(&mut self, dn: &str, password: &str) -> BackendResult<()>;

    /// Subtree search under `base_dn`, returning the DNs of all matches.
    async fn search_dns(&mut self, base_dn: &str, filter: &str) -> BackendResult<Vec<String>>;

    /// Submit a password modification for the entry at `dn`.
    async fn modify_password(
        &mut self,
        dn: &str,
        modification: &PasswordModification,
    ) -> BackendResult<()>;

    /// Close the connection.
    async fn unbind(&mut self) -> BackendResult<()>;
}

/// Opens sessions to a configured backend.
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Open a new connection. One connection is opened per adapter call.
    async fn connect(&self, config: &BackendConfig) -> BackendResult<Box<dyn DirectorySession>>;
}
