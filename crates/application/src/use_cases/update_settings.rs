//! Update settings use case.

use std::path::PathBuf;
use std::sync::Arc;

use orads_domain::{ConfigEdit, DataSourceSettings};
use tracing::info;

use crate::error::ApplicationResult;
use crate::ports::{SettingsError, SettingsRepository};

/// Input for updating data source settings.
#[derive(Debug, Clone)]
pub struct UpdateSettingsInput {
    /// Where the settings are stored.
    pub location: PathBuf,
    /// Used when no settings exist yet.
    pub uid: String,
    /// Used when no settings exist yet.
    pub name: String,
    /// Form edits, applied in order.
    pub edits: Vec<ConfigEdit>,
}

/// Applies configuration form edits and saves the result.
pub struct UpdateSettings<S: ?Sized> {
    repository: Arc<S>,
}

impl<S: SettingsRepository + ?Sized> UpdateSettings<S> {
    /// Creates a new `UpdateSettings` use case.
    #[must_use]
    pub const fn new(repository: Arc<S>) -> Self {
        Self { repository }
    }

    /// Loads the current settings, applies the edits and saves.
    ///
    /// # Returns
    /// The settings as persisted, without secret values.
    ///
    /// # Errors
    /// - `Domain` if an edit is invalid; nothing is saved in that case
    /// - `Settings` if loading or saving fails
    pub async fn execute(
        &self,
        input: UpdateSettingsInput,
    ) -> ApplicationResult<DataSourceSettings> {
        let mut settings = match self.repository.load(&input.location).await {
            Ok(settings) => settings,
            Err(SettingsError::NotFound(_)) => DataSourceSettings::new(input.uid, input.name),
            Err(e) => return Err(e.into()),
        };

        let edit_count = input.edits.len();
        for edit in input.edits {
            settings.apply(edit)?;
        }

        let saved = self.repository.save(&input.location, &settings).await?;
        info!(
            uid = %saved.uid,
            edits = edit_count,
            password_configured = saved.is_password_configured(),
            "settings saved"
        );
        Ok(saved)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ApplicationError;
    use crate::test_support::InMemorySettingsRepository;
    use orads_domain::{DomainError, PASSWORD_FIELD};
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use std::time::Duration;

    fn input(edits: Vec<ConfigEdit>) -> UpdateSettingsInput {
        UpdateSettingsInput {
            location: PathBuf::from("/ds"),
            uid: "ora-1".to_string(),
            name: "Oracle".to_string(),
            edits,
        }
    }

    #[tokio::test]
    async fn test_creates_settings_when_missing() {
        let repo = Arc::new(InMemorySettingsRepository::new());
        let use_case = UpdateSettings::new(Arc::clone(&repo));

        let saved = use_case
            .execute(input(vec![
                ConfigEdit::Hostname("db.local".into()),
                ConfigEdit::Port(1521),
                ConfigEdit::MaxIdleTime("5m".into()),
                ConfigEdit::Password("tiger".into()),
            ]))
            .await
            .unwrap();

        assert_eq!(saved.uid, "ora-1");
        assert_eq!(saved.json_data.hostname, "db.local");
        assert_eq!(saved.json_data.port, 1521);
        assert_eq!(
            saved.json_data.max_idle_time.as_duration(),
            Duration::from_secs(300)
        );
        assert!(saved.is_password_configured());
        assert_eq!(saved.secure_json_data, None);
        assert_eq!(repo.secret(PASSWORD_FIELD), Some("tiger".to_string()));
    }

    #[tokio::test]
    async fn test_reset_password_clears_secret() {
        let repo = Arc::new(InMemorySettingsRepository::new());
        repo.store(DataSourceSettings::new("ora-1", "Oracle"), Some("x"));
        let use_case = UpdateSettings::new(Arc::clone(&repo));

        let saved = use_case
            .execute(input(vec![ConfigEdit::ResetPassword]))
            .await
            .unwrap();

        assert!(!saved.is_password_configured());
        assert_eq!(repo.secret(PASSWORD_FIELD), None);
        let loaded = repo.load(Path::new("/ds")).await.unwrap();
        assert!(!loaded.is_password_configured());
    }

    #[tokio::test]
    async fn test_invalid_edit_saves_nothing() {
        let repo = Arc::new(InMemorySettingsRepository::new());
        let use_case = UpdateSettings::new(Arc::clone(&repo));

        let err = use_case
            .execute(input(vec![
                ConfigEdit::User("scott".into()),
                ConfigEdit::MaxLifeTime("5x".into()),
            ]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::InvalidDuration(_))
        ));
        assert!(repo.load(Path::new("/ds")).await.is_err());
    }
}
