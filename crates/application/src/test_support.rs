//! Fake ports shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use orads_domain::{
    DataQueryResponse, DataResponse, DataSourceSettings, PASSWORD_FIELD, QueryRequest,
    ScopedVars, SecretUpdate,
};

use crate::ports::{
    QueryResponseStream, QueryTransport, SettingsError, SettingsRepository, TemplateResolver,
    TransportError,
};
use crate::variable_resolver::TemplateSrv;

/// Transport that records every request and replays queued responses.
///
/// With nothing queued it answers with one empty result per target.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<QueryRequest>>,
    responses: Mutex<VecDeque<Vec<Result<DataQueryResponse, TransportError>>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, items: Vec<Result<DataQueryResponse, TransportError>>) {
        self.responses.lock().unwrap().push_back(items);
    }

    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl QueryTransport for RecordingTransport {
    fn query(&self, request: QueryRequest) -> QueryResponseStream {
        let items = self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            let mut response = DataQueryResponse::empty();
            for target in &request.targets {
                response
                    .results
                    .insert(target.ref_id.clone(), DataResponse::default());
            }
            vec![Ok(response)]
        });
        self.requests.lock().unwrap().push(request);
        stream::iter(items).boxed()
    }
}

/// Resolver that delegates to a [`TemplateSrv`] and counts calls.
#[derive(Default)]
pub struct CountingResolver {
    inner: TemplateSrv,
    calls: AtomicUsize,
}

impl CountingResolver {
    pub fn new(inner: TemplateSrv) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TemplateResolver for CountingResolver {
    fn replace(&self, text: &str, scoped_vars: Option<&ScopedVars>) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.replace(text, scoped_vars)
    }
}

/// Settings repository holding a single instance in memory.
#[derive(Default)]
pub struct InMemorySettingsRepository {
    settings: Mutex<Option<DataSourceSettings>>,
    secrets: Mutex<HashMap<String, String>>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository as if the settings had been saved.
    pub fn store(&self, mut settings: DataSourceSettings, password: Option<&str>) {
        if let Some(password) = password {
            settings.set_password(password);
        }
        let (persisted, update) = settings.into_persisted();
        self.apply_secret(update);
        *self.settings.lock().unwrap() = Some(persisted);
    }

    pub fn secret(&self, field: &str) -> Option<String> {
        self.secrets.lock().unwrap().get(field).cloned()
    }

    fn apply_secret(&self, update: SecretUpdate) {
        let mut secrets = self.secrets.lock().unwrap();
        match update {
            SecretUpdate::Set(value) => {
                secrets.insert(PASSWORD_FIELD.to_string(), value);
            }
            SecretUpdate::Clear => {
                secrets.remove(PASSWORD_FIELD);
            }
            SecretUpdate::Keep => {}
        }
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn load(&self, location: &Path) -> Result<DataSourceSettings, SettingsError> {
        self.settings
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SettingsError::NotFound(PathBuf::from(location)))
    }

    async fn save(
        &self,
        _location: &Path,
        settings: &DataSourceSettings,
    ) -> Result<DataSourceSettings, SettingsError> {
        let (persisted, update) = settings.clone().into_persisted();
        self.apply_secret(update);
        *self.settings.lock().unwrap() = Some(persisted.clone());
        Ok(persisted)
    }

    async fn load_secure(
        &self,
        _location: &Path,
    ) -> Result<HashMap<String, String>, SettingsError> {
        Ok(self.secrets.lock().unwrap().clone())
    }
}
