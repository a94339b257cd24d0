//! Backend service configuration.
//!
//! The studio front end talks to a hosted analytics/database backend. The
//! bridge never calls it; this module only models its configuration record
//! and gives it an explicit lifetime. A `Backend` is built once from a
//! validated config and passed to whatever needs it, then shut down.

use serde::Deserialize;

use crate::error::BridgeError;

/// Connection record for the hosted backend. Keys are camelCase on disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    pub api_key: String,
    pub auth_domain: String,
    #[serde(rename = "databaseURL")]
    pub database_url: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    #[serde(default)]
    pub measurement_id: Option<String>,
}

impl BackendConfig {
    /// Check the fields the backend cannot start without.
    pub fn validate(&self) -> Result<(), BridgeError> {
        for (field, value) in [
            ("apiKey", &self.api_key),
            ("projectId", &self.project_id),
            ("appId", &self.app_id),
        ] {
            if value.trim().is_empty() {
                return Err(BridgeError::Config(format!("backend.{field} must not be empty")));
            }
        }
        Ok(())
    }
}

/// An initialized backend handle.
#[derive(Debug)]
pub struct Backend {
    config: BackendConfig,
}

impl Backend {
    /// Validate `config` and bring the backend up.
    pub fn init(config: BackendConfig) -> Result<Self, BridgeError> {
        config.validate()?;
        tracing::info!(
            project = %config.project_id,
            analytics = config.measurement_id.is_some(),
            "backend initialized"
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn analytics_enabled(&self) -> bool {
        self.config.measurement_id.is_some()
    }

    /// Release the backend. Returns the config it was built from.
    pub fn shutdown(self) -> BackendConfig {
        tracing::info!(project = %self.config.project_id, "backend shut down");
        self.config
    }
}
