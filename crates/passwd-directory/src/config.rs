//! Backend configuration
//!
//! Configuration types for one directory backend. A backend configuration
//! is loaded once at startup, validated, and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{BackendError, BackendResult};

/// Placeholder substituted with the user id in the search filter template.
pub const UID_PLACEHOLDER: &str = "{uid}";

/// Configuration for one directory backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Display name used in logs (defaults to `ldap:<index>`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Directory server hostname or IP address.
    pub host: String,

    /// Directory server port (389 for LDAP, 636 for LDAPS when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Use SSL/TLS (LDAPS).
    #[serde(default)]
    pub use_ssl: bool,

    /// Use STARTTLS upgrade on plain LDAP connection.
    #[serde(default)]
    pub use_starttls: bool,

    /// Whether to verify the server certificate.
    #[serde(default = "default_true")]
    pub verify_certificate: bool,

    /// Base DN the user search is scoped under (e.g., "ou=People,dc=example,dc=com").
    #[serde(alias = "base")]
    pub base_dn: String,

    /// Search filter template with exactly one `{uid}` placeholder.
    pub search_filter: String,

    /// Schema conventions used for the password modification.
    #[serde(default)]
    pub schema: SchemaVariant,

    /// DN used to bind for the user search (anonymous when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_bind_dn: Option<String>,

    /// Password for `search_bind_dn`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_bind_password: Option<String>,

    /// Connection timeouts.
    #[serde(default)]
    pub connection: ConnectionSettings,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("use_starttls", &self.use_starttls)
            .field("verify_certificate", &self.verify_certificate)
            .field("base_dn", &self.base_dn)
            .field("search_filter", &self.search_filter)
            .field("schema", &self.schema)
            .field("search_bind_dn", &self.search_bind_dn)
            .field(
                "search_bind_password",
                &self.search_bind_password.as_ref().map(|_| "***REDACTED***"),
            )
            .field("connection", &self.connection)
            .finish()
    }
}

fn default_true() -> bool {
    true
}

/// Schema conventions of a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaVariant {
    /// Standard LDAP (OpenLDAP, 389-ds, ...).
    #[serde(alias = "ldap")]
    Standard {
        #[serde(default)]
        password_change: StandardPasswordChange,
        /// Attribute replaced when `password_change` is `replace`.
        #[serde(default = "default_password_attribute")]
        password_attribute: String,
    },

    /// Active Directory style directory (AD, Samba 4).
    #[serde(alias = "ad")]
    ActiveDirectory {
        /// Domain suffix used to build the `uid@domain` principal.
        #[serde(alias = "ad_domain")]
        domain: String,
        #[serde(default)]
        password_change: AdPasswordChange,
    },
}

impl Default for SchemaVariant {
    fn default() -> Self {
        Self::Standard {
            password_change: StandardPasswordChange::default(),
            password_attribute: default_password_attribute(),
        }
    }
}

/// How a standard LDAP backend receives the new password.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardPasswordChange {
    /// Replace the value of the password attribute.
    #[default]
    Replace,
    /// RFC 3062 Password Modify extended operation.
    ExtendedOperation,
}

fn default_password_attribute() -> String {
    "userPassword".to_string()
}

/// How an Active Directory backend receives the new password.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdPasswordChange {
    /// Replace `unicodePwd` with the new encoded value.
    #[default]
    Replace,
    /// Delete the old encoded value and add the new one in a single modify.
    Change,
}

/// Timeouts for directory operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Timeout for each bind, search and modify, in seconds.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_operation_timeout() -> u64 {
    10
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            operation_timeout_secs: default_operation_timeout(),
        }
    }
}

impl ConnectionSettings {
    /// Get connection timeout as Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Get per-operation timeout as Duration.
    #[must_use]
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

impl BackendConfig {
    /// Create a standard LDAP backend config with required fields.
    pub fn new(
        host: impl Into<String>,
        base_dn: impl Into<String>,
        search_filter: impl Into<String>,
    ) -> Self {
        Self {
            name: None,
            host: host.into(),
            port: None,
            use_ssl: false,
            use_starttls: false,
            verify_certificate: true,
            base_dn: base_dn.into(),
            search_filter: search_filter.into(),
            schema: SchemaVariant::default(),
            search_bind_dn: None,
            search_bind_password: None,
            connection: ConnectionSettings::default(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Enable SSL (LDAPS).
    #[must_use]
    pub fn with_ssl(mut self) -> Self {
        self.use_ssl = true;
        self
    }

    /// Enable STARTTLS.
    #[must_use]
    pub fn with_starttls(mut self) -> Self {
        self.use_starttls = true;
        self
    }

    /// Use Active Directory conventions with the given domain suffix.
    pub fn with_active_directory(mut self, domain: impl Into<String>) -> Self {
        self.schema = SchemaVariant::ActiveDirectory {
            domain: domain.into(),
            password_change: AdPasswordChange::default(),
        };
        self
    }

    /// Set the schema variant.
    #[must_use]
    pub fn with_schema(mut self, schema: SchemaVariant) -> Self {
        self.schema = schema;
        self
    }

    /// Bind with a service account for the user search.
    pub fn with_search_bind(
        mut self,
        dn: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.search_bind_dn = Some(dn.into());
        self.search_bind_password = Some(password.into());
        self
    }

    /// Set connection timeouts.
    #[must_use]
    pub fn with_connection(mut self, connection: ConnectionSettings) -> Self {
        self.connection = connection;
        self
    }

    /// Effective port, defaulting by transport.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(if self.use_ssl { 636 } else { 389 })
    }

    /// Get the LDAP URL.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, self.host, self.port())
    }

    /// Whether the transport to this backend is encrypted.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.use_ssl || self.use_starttls
    }

    /// Validate the configuration.
    pub fn validate(&self) -> BackendResult<()> {
        if self.host.trim().is_empty() {
            return Err(BackendError::invalid_config("host is required"));
        }

        if self.port == Some(0) {
            return Err(BackendError::invalid_config("port must be non-zero"));
        }

        if self.base_dn.trim().is_empty() {
            return Err(BackendError::invalid_config("base_dn is required"));
        }

        let placeholders = self.search_filter.matches(UID_PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(BackendError::invalid_config(format!(
                "search_filter must contain exactly one {UID_PLACEHOLDER} placeholder (found {placeholders})"
            )));
        }

        if self.use_ssl && self.use_starttls {
            return Err(BackendError::invalid_config(
                "cannot use both SSL and STARTTLS",
            ));
        }

        if self.search_bind_password.is_some() && self.search_bind_dn.is_none() {
            return Err(BackendError::invalid_config(
                "search_bind_password is set without search_bind_dn",
            ));
        }

        if self.search_bind_dn.is_some()
            && self
                .search_bind_password
                .as_deref()
                .map_or(true, str::is_empty)
        {
            return Err(BackendError::invalid_config(
                "search_bind_dn is set without search_bind_password",
            ));
        }

        if self.connection.connect_timeout_secs == 0 || self.connection.operation_timeout_secs == 0
        {
            return Err(BackendError::invalid_config("timeouts must be non-zero"));
        }

        if let SchemaVariant::ActiveDirectory { domain, .. } = &self.schema {
            if domain.trim().is_empty() {
                return Err(BackendError::invalid_config(
                    "domain is required for active_directory backends",
                ));
            }
            // AD rejects unicodePwd modifications over non-encrypted connections.
            if !self.is_encrypted() {
                return Err(BackendError::invalid_config(
                    "active_directory backends require SSL or STARTTLS for password operations",
                ));
            }
        }

        Ok(())
    }
}

/// Ordered identity of a configured backend.
///
/// The index is the backend's position in the configured list; it defines
/// both processing order and (reversed) rollback order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackendId {
    pub index: usize,
    pub name: String,
}

impl BackendId {
    /// Create an identity for the backend at `index`.
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }

    /// Identity for a configured backend, naming it `ldap:<index>` when unnamed.
    #[must_use]
    pub fn for_config(index: usize, config: &BackendConfig) -> Self {
        let name = config
            .name
            .clone()
            .unwrap_or_else(|| format!("ldap:{index}"));
        Self { index, name }
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> BackendConfig {
        BackendConfig::new("ldap.example.com", "dc=example,dc=com", "uid={uid}")
    }

    #[test]
    fn test_standard_config_is_valid() {
        assert!(standard().validate().is_ok());
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(standard().port(), 389);
        assert_eq!(standard().with_ssl().port(), 636);
        assert_eq!(standard().with_ssl().with_port(10636).port(), 10636);
    }

    #[test]
    fn test_url() {
        assert_eq!(standard().url(), "ldap://ldap.example.com:389");
        assert_eq!(standard().with_ssl().url(), "ldaps://ldap.example.com:636");
    }

    #[test]
    fn test_filter_requires_exactly_one_placeholder() {
        let mut config = standard();
        config.search_filter = "uid=alice".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exactly one"));

        config.search_filter = "(|(uid={uid})(mail={uid}))".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_host_rejected() {
        let mut config = standard();
        config.host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ssl_and_starttls_conflict() {
        let config = standard().with_ssl().with_starttls();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ad_requires_domain_and_encryption() {
        let config = standard().with_active_directory("example.com");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SSL"));

        let config = standard().with_ssl().with_active_directory("example.com");
        assert!(config.validate().is_ok());

        let config = standard().with_ssl().with_active_directory("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_search_password_requires_dn() {
        let mut config = standard();
        config.search_bind_password = Some("secret".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_search_dn_requires_password() {
        let mut config = standard();
        config.search_bind_dn = Some("cn=reader,dc=example,dc=com".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("search_bind_password"));

        config.search_bind_password = Some(String::new());
        assert!(config.validate().is_err());

        let config = standard().with_search_bind("cn=reader,dc=example,dc=com", "reader");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_search_password() {
        let config = standard().with_search_bind("cn=reader,dc=example,dc=com", "s3cret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("***REDACTED***"));
    }

    #[test]
    fn test_backend_id_defaults_to_index_name() {
        assert_eq!(BackendId::for_config(2, &standard()).name, "ldap:2");
        let named = standard().with_name("corp");
        assert_eq!(BackendId::for_config(0, &named).to_string(), "corp");
    }

    #[test]
    fn test_deserialize_ad_backend() {
        let json = serde_json::json!({
            "host": "dc1.corp.example.com",
            "use_ssl": true,
            "base": "dc=corp,dc=example,dc=com",
            "search_filter": "sAMAccountName={uid}",
            "schema": { "type": "ad", "ad_domain": "corp.example.com" }
        });
        let config: BackendConfig = serde_json::from_value(json).unwrap();
        assert_eq!(
            config.schema,
            SchemaVariant::ActiveDirectory {
                domain: "corp.example.com".to_string(),
                password_change: AdPasswordChange::Replace,
            }
        );
        assert_eq!(config.port(), 636);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_standard_defaults() {
        let json = serde_json::json!({
            "host": "ldap.example.com",
            "base_dn": "dc=example,dc=com",
            "search_filter": "uid={uid}",
        });
        let config: BackendConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.schema, SchemaVariant::default());
        assert_eq!(config.connection, ConnectionSettings::default());
        assert!(config.verify_certificate);
    }

    #[test]
    fn test_deserialize_extended_operation() {
        let json = serde_json::json!({
            "type": "standard",
            "password_change": "extended_operation"
        });
        let schema: SchemaVariant = serde_json::from_value(json).unwrap();
        assert_eq!(
            schema,
            SchemaVariant::Standard {
                password_change: StandardPasswordChange::ExtendedOperation,
                password_attribute: "userPassword".to_string(),
            }
        );
    }

    #[test]
    fn test_deserialize_replace_with_attribute() {
        let yaml = r#"
type: standard
password_change: replace
password_attribute: sambaNTPassword
"#;
        let schema: SchemaVariant = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            schema,
            SchemaVariant::Standard {
                password_change: StandardPasswordChange::Replace,
                password_attribute: "sambaNTPassword".to_string(),
            }
        );

        let schema: SchemaVariant =
            serde_yaml::from_str("type: standard\npassword_change: replace\n").unwrap();
        assert_eq!(schema, SchemaVariant::default());
    }
}
