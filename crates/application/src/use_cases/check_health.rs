//! Check health use case.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::ports::SettingsRepository;

/// Outcome of a health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    /// The data source is usable.
    Ok,
    /// The data source is misconfigured.
    Error,
}

/// Result reported to the host's "Save & test" action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheckResult {
    /// Overall status.
    pub status: HealthStatus,
    /// Message shown to the user.
    pub message: String,
}

impl HealthCheckResult {
    fn new(status: HealthStatus, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }
}

/// Verifies that the stored settings are complete enough to connect.
pub struct CheckHealth<S: ?Sized> {
    repository: Arc<S>,
    location: PathBuf,
}

impl<S: SettingsRepository + ?Sized> CheckHealth<S> {
    /// Creates a new `CheckHealth` use case for the settings at `location`.
    #[must_use]
    pub fn new(repository: Arc<S>, location: impl Into<PathBuf>) -> Self {
        Self {
            repository,
            location: location.into(),
        }
    }

    /// Runs the check. Problems are reported in the result, never as errors.
    pub async fn execute(&self) -> HealthCheckResult {
        let settings = match self.repository.load_plugin_settings(&self.location).await {
            Ok(settings) => settings,
            Err(e) => {
                error!(location = %self.location.display(), error = %e, "health check failed");
                return HealthCheckResult::new(HealthStatus::Error, "Unable to load settings");
            }
        };

        if settings.secrets.password.is_empty() {
            return HealthCheckResult::new(HealthStatus::Error, "Password key is missing");
        }

        info!(hostname = %settings.options.hostname, "health check passed");
        HealthCheckResult::new(HealthStatus::Ok, "Data source is working")
    }
}
