//! File-based data source settings repository.
//!
//! Settings live in a directory per data source instance:
//!
//! ```text
//! <dir>/
//!   datasource.json      uid, name, jsonData, secureJsonFields
//!   .orads/
//!     secure.json        secret values keyed by field name
//! ```
//!
//! `.orads/` should be kept out of version control.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use orads_application::ports::{SettingsError, SettingsRepository};
use orads_domain::{DataSourceSettings, PASSWORD_FIELD, SecretUpdate};
use tokio::fs;
use tracing::debug;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// File-based settings repository.
#[derive(Debug, Clone, Default)]
pub struct FileSettingsRepository;

impl FileSettingsRepository {
    /// Creates a new file-based settings repository.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the settings file path for an instance directory.
    #[must_use]
    pub fn settings_path(dir: &Path) -> PathBuf {
        dir.join("datasource.json")
    }

    /// Returns the secure values file path for an instance directory.
    #[must_use]
    pub fn secure_path(dir: &Path) -> PathBuf {
        dir.join(".orads").join("secure.json")
    }

    async fn read_secure(dir: &Path) -> Result<BTreeMap<String, String>, SettingsError> {
        let path = Self::secure_path(dir);
        if !fs::try_exists(&path).await? {
            return Ok(BTreeMap::new());
        }
        let content = fs::read(&path).await?;
        from_json_bytes(&content).map_err(|e| SettingsError::Serialization(e.to_string()))
    }

    async fn write_secure(
        dir: &Path,
        secrets: &BTreeMap<String, String>,
    ) -> Result<(), SettingsError> {
        let path = Self::secure_path(dir);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content =
            to_json_stable_bytes(secrets).map_err(|e| SettingsError::Serialization(e.to_string()))?;
        fs::write(&path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for FileSettingsRepository {
    async fn load(&self, location: &Path) -> Result<DataSourceSettings, SettingsError> {
        let path = Self::settings_path(location);
        if !fs::try_exists(&path).await? {
            return Err(SettingsError::NotFound(path));
        }

        let content = fs::read(&path).await?;
        let mut settings: DataSourceSettings =
            from_json_bytes(&content).map_err(|e| SettingsError::Serialization(e.to_string()))?;
        settings.secure_json_data = None;
        Ok(settings)
    }

    async fn save(
        &self,
        location: &Path,
        settings: &DataSourceSettings,
    ) -> Result<DataSourceSettings, SettingsError> {
        let (persisted, update) = settings.clone().into_persisted();
        let content = to_json_stable_bytes(&persisted)
            .map_err(|e| SettingsError::Serialization(e.to_string()))?;

        // Secure store before plain file: a flagged password must be stored.
        fs::create_dir_all(location).await?;
        match update {
            SecretUpdate::Keep => {}
            SecretUpdate::Set(value) => {
                let mut secrets = Self::read_secure(location).await?;
                secrets.insert(PASSWORD_FIELD.to_string(), value);
                Self::write_secure(location, &secrets).await?;
            }
            SecretUpdate::Clear => {
                let mut secrets = Self::read_secure(location).await?;
                if secrets.remove(PASSWORD_FIELD).is_some() {
                    Self::write_secure(location, &secrets).await?;
                }
            }
        }
        fs::write(Self::settings_path(location), content).await?;

        debug!(
            location = %location.display(),
            password_configured = persisted.is_password_configured(),
            "saved data source settings"
        );
        Ok(persisted)
    }

    async fn load_secure(&self, location: &Path) -> Result<HashMap<String, String>, SettingsError> {
        Ok(Self::read_secure(location).await?.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use orads_domain::ConfigEdit;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn settings_with_password(password: &str) -> DataSourceSettings {
        let mut settings = DataSourceSettings::new("ora-1", "Oracle");
        settings.apply(ConfigEdit::Hostname("db.local".into())).unwrap();
        settings.apply(ConfigEdit::Password(password.into())).unwrap();
        settings
    }

    #[test]
    fn test_paths() {
        let dir = PathBuf::from("/etc/orads/ora-1");
        assert_eq!(
            FileSettingsRepository::settings_path(&dir),
            PathBuf::from("/etc/orads/ora-1/datasource.json")
        );
        assert_eq!(
            FileSettingsRepository::secure_path(&dir),
            PathBuf::from("/etc/orads/ora-1/.orads/secure.json")
        );
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let repo = FileSettingsRepository::new();

        let err = repo.load(temp.path()).await.unwrap_err();

        assert!(matches!(err, SettingsError::NotFound(_)));
        assert!(repo.load_secure(temp.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_secret_stored_separately() {
        let temp = TempDir::new().unwrap();
        let repo = FileSettingsRepository::new();

        repo.save(temp.path(), &settings_with_password("tiger"))
            .await
            .unwrap();

        let plain =
            std::fs::read_to_string(FileSettingsRepository::settings_path(temp.path())).unwrap();
        assert!(!plain.contains("tiger"));
        assert!(plain.contains("\"password\": true"));

        let loaded = repo.load(temp.path()).await.unwrap();
        assert!(loaded.is_password_configured());
        assert_eq!(loaded.secure_json_data, None);
        assert_eq!(loaded.json_data.hostname, "db.local");

        let secure = repo.load_secure(temp.path()).await.unwrap();
        assert_eq!(secure.get(PASSWORD_FIELD).map(String::as_str), Some("tiger"));
    }

    #[tokio::test]
    async fn test_save_without_new_secret_keeps_existing() {
        let temp = TempDir::new().unwrap();
        let repo = FileSettingsRepository::new();
        repo.save(temp.path(), &settings_with_password("tiger"))
            .await
            .unwrap();

        let mut loaded = repo.load(temp.path()).await.unwrap();
        loaded.apply(ConfigEdit::Port(1522)).unwrap();
        repo.save(temp.path(), &loaded).await.unwrap();

        let plugin = repo.load_plugin_settings(temp.path()).await.unwrap();
        assert_eq!(plugin.options.port, 1522);
        assert_eq!(plugin.secrets.password, "tiger");
    }

    #[tokio::test]
    async fn test_reset_clears_secret() {
        let temp = TempDir::new().unwrap();
        let repo = FileSettingsRepository::new();
        repo.save(temp.path(), &settings_with_password("x"))
            .await
            .unwrap();

        let mut loaded = repo.load(temp.path()).await.unwrap();
        loaded.reset_password();
        let saved = repo.save(temp.path(), &loaded).await.unwrap();

        assert!(!saved.is_password_configured());
        assert!(!repo.load(temp.path()).await.unwrap().is_password_configured());
        assert!(repo.load_secure(temp.path()).await.unwrap().is_empty());
        assert_eq!(
            repo.load_plugin_settings(temp.path()).await.unwrap().secrets.password,
            ""
        );
    }

    #[tokio::test]
    async fn test_failed_secret_write_leaves_no_settings() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".orads"), "not a directory").unwrap();
        let repo = FileSettingsRepository::new();

        let err = repo
            .save(temp.path(), &settings_with_password("tiger"))
            .await
            .unwrap_err();

        assert!(matches!(err, SettingsError::Io(_)));
        assert!(!FileSettingsRepository::settings_path(temp.path()).exists());
        assert!(matches!(
            repo.load(temp.path()).await.unwrap_err(),
            SettingsError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_corrupt_settings_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(FileSettingsRepository::settings_path(temp.path()), "{ nope").unwrap();

        let err = FileSettingsRepository::new().load(temp.path()).await.unwrap_err();

        assert!(matches!(err, SettingsError::Serialization(_)));
    }
}
