//! Settings repository port
//!
//! Defines the interface for data source settings persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use orads_domain::{DataSourceSettings, PluginSettings};

/// Errors that can occur during settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No settings have been saved at this location.
    #[error("Settings not found: {0}")]
    NotFound(PathBuf),
}

/// Repository trait for data source settings.
///
/// Non-secret settings and secret values are stored separately. Secrets are
/// write-only through [`save`](Self::save): [`load`](Self::load) only reports
/// which secure fields are configured.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Loads the settings stored at `location`.
    ///
    /// The returned settings never carry secret values.
    async fn load(&self, location: &Path) -> Result<DataSourceSettings, SettingsError>;

    /// Saves the settings and any pending secret values.
    ///
    /// # Returns
    /// The settings as they would be loaded back.
    async fn save(
        &self,
        location: &Path,
        settings: &DataSourceSettings,
    ) -> Result<DataSourceSettings, SettingsError>;

    /// Loads the decrypted secure values, keyed by field name.
    async fn load_secure(&self, location: &Path) -> Result<HashMap<String, String>, SettingsError>;

    /// Loads settings together with decrypted secrets, as the backend sees them.
    async fn load_plugin_settings(&self, location: &Path) -> Result<PluginSettings, SettingsError> {
        let settings = self.load(location).await?;
        let secure = self.load_secure(location).await?;
        Ok(PluginSettings::from_settings(&settings, &secure))
    }
}
