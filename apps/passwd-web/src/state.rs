//! Application state shared across all request handlers.

use std::sync::Arc;

use passwd_directory::DirectoryConnector;
use passwd_orchestrator::ChangeOrchestrator;
use passwd_quality::QualityPolicy;

use crate::config::AppConfig;
use crate::error::AppResult;

/// Shared handler state. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: ChangeOrchestrator,
    pub version: &'static str,
}

impl AppState {
    pub fn new(orchestrator: ChangeOrchestrator) -> Self {
        Self {
            orchestrator,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Build the quality policy and every backend adapter from configuration.
    pub fn from_config(
        config: &AppConfig,
        connector: Arc<dyn DirectoryConnector>,
    ) -> AppResult<Self> {
        let policy = config
            .quality
            .as_ref()
            .map(QualityPolicy::from_config)
            .transpose()?
            .map(Arc::new);

        let orchestrator =
            ChangeOrchestrator::from_configs(config.backends.clone(), policy, connector)?;
        Ok(Self::new(orchestrator))
    }
}
