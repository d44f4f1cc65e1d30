//! Application configuration loading and types.

use passwd_directory::{BackendConfig, BackendId};
use passwd_quality::QualityPolicyConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Directories to change, in processing order.
    pub backends: Vec<BackendConfig>,
    /// Password quality policy; no checks when absent.
    #[serde(default)]
    pub quality: Option<QualityPolicyConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_body_size")]
    pub max_body_size_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_timeout(),
            max_body_size_bytes: default_max_body_size(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    16 * 1024
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load, override from the environment and validate.
    pub fn load() -> AppResult<Self> {
        let mut config = Self::from_file(Self::config_path())?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Get the configuration file path from environment or default.
    pub fn config_path() -> String {
        std::env::var("PASSWD_CONFIG").unwrap_or_else(|_| "./config/passwd.yaml".to_string())
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("PASSWD_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PASSWD_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
    }

    /// Check everything that can be checked before touching the network.
    pub fn validate(&self) -> AppResult<()> {
        if self.backends.is_empty() {
            return Err(AppError::Config(
                "at least one backend must be configured".to_string(),
            ));
        }
        for (index, backend) in self.backends.iter().enumerate() {
            backend.validate().map_err(|e| {
                AppError::Config(format!(
                    "backend {}: {e}",
                    BackendId::for_config(index, backend)
                ))
            })?;
        }
        if self.server.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "server.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(quality) = &self.quality {
            if quality.dictionary_check_enabled && quality.dictionary_file.is_none() {
                return Err(AppError::Config(
                    "quality.dictionary_file is required when dictionary_check_enabled is set"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }
}
