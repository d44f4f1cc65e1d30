//! # Directory backends
//!
//! Backend adapters that change one user's password in one directory.
//!
//! Each adapter opens a connection, authenticates, resolves the user's entry
//! through a search-filter template and submits a password modification in
//! the encoding its schema requires:
//!
//! - **standard** LDAP: a plain `userPassword` replacement, or the RFC 3062
//!   Password Modify extended operation
//! - **Active Directory**: `unicodePwd` as a quoted UTF-16LE value, bound as
//!   `uid@domain`
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use passwd_directory::{build_backend, BackendConfig, LdapConnector};
//!
//! let config = BackendConfig::new("ldap.example.com", "dc=example,dc=com", "uid={uid}")
//!     .with_starttls();
//! let backend = build_backend(0, config, Arc::new(LdapConnector::new()))?;
//! backend.apply("jdoe", "old-secret", "N3w-secret!").await?;
//! ```

pub mod ad;
pub mod backend;
pub mod config;
pub mod error;
pub mod filter;
pub mod ldap;
pub mod modification;
pub mod session;
pub mod standard;

// Re-exports
pub use ad::ActiveDirectoryBackend;
pub use backend::{build_backend, PasswordBackend};
pub use config::{
    AdPasswordChange, BackendConfig, BackendId, ConnectionSettings, SchemaVariant,
    StandardPasswordChange,
};
pub use error::{BackendError, BackendResult, FailureKind};
pub use filter::render_search_filter;
pub use ldap::LdapConnector;
pub use modification::PasswordModification;
pub use session::{DirectoryConnector, DirectorySession};
pub use standard::StandardBackend;
