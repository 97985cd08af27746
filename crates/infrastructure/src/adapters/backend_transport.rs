//! Query transport backed by the host's data source query API.
//!
//! Requests are posted to `<base>/api/ds/query`, where the host routes them
//! to the plugin backend that owns the database connection.

use std::time::Duration;

use futures::{StreamExt, stream};
use orads_application::ports::{QueryResponseStream, QueryTransport, TransportError};
use orads_domain::{DataQueryResponse, DataSourceRef, Query, QueryRequest};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// Path of the query endpoint relative to the host base URL.
const QUERY_PATH: &str = "api/ds/query";

/// Connection options for [`BackendQueryTransport`].
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the host, e.g. `http://localhost:3000/`.
    pub base_url: Url,
    /// Uid of the data source instance queries are routed to.
    pub datasource_uid: String,
    /// Service account token, sent as a bearer token.
    pub api_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl BackendConfig {
    /// Creates a config with a 30 second timeout and no token.
    #[must_use]
    pub fn new(base_url: Url, datasource_uid: impl Into<String>) -> Self {
        Self {
            base_url,
            datasource_uid: datasource_uid.into(),
            api_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Body of a query API call.
#[derive(Debug, Clone, Serialize)]
pub struct BackendRequest {
    /// Targets, each tagged with its data source.
    pub queries: Vec<Query>,
    /// Range start in epoch milliseconds.
    pub from: String,
    /// Range end in epoch milliseconds.
    pub to: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// HTTP query transport using reqwest.
pub struct BackendQueryTransport {
    client: Client,
    query_url: Url,
    datasource_uid: String,
    api_token: Option<String>,
}

impl BackendQueryTransport {
    /// Creates a transport for the given host and data source.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Network` if the base URL cannot be extended
    /// or the HTTP client cannot be created.
    pub fn new(config: BackendConfig) -> Result<Self, TransportError> {
        let query_url = config
            .base_url
            .join(QUERY_PATH)
            .map_err(|e| TransportError::Network(format!("invalid base URL: {e}")))?;

        let client = Client::builder()
            .user_agent(concat!("orads/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            query_url,
            datasource_uid: config.datasource_uid,
            api_token: config.api_token,
        })
    }

    /// Returns the endpoint queries are posted to.
    #[must_use]
    pub const fn query_url(&self) -> &Url {
        &self.query_url
    }

    /// Builds the API body for a request.
    ///
    /// Targets without a data source are bound to this transport's instance.
    /// Request-level interval hints are copied onto targets that lack them.
    #[must_use]
    pub fn build_request_body(&self, request: &QueryRequest) -> BackendRequest {
        let queries = request
            .targets
            .iter()
            .map(|target| {
                let mut query = target.clone();
                if query.datasource.is_none() {
                    query.datasource = Some(DataSourceRef::new(&self.datasource_uid));
                }
                query
                    .extra
                    .entry("intervalMs")
                    .or_insert_with(|| Value::from(request.interval_ms));
                if let Some(max) = request.max_data_points {
                    query
                        .extra
                        .entry("maxDataPoints")
                        .or_insert_with(|| Value::from(max));
                }
                query
            })
            .collect();

        BackendRequest {
            queries,
            from: request.range.from_ms().to_string(),
            to: request.range.to_ms().to_string(),
        }
    }

    fn map_error(error: &reqwest::Error) -> TransportError {
        if error.is_decode() {
            return TransportError::Decode(error.to_string());
        }
        if error.is_timeout() {
            return TransportError::Network(format!("request timed out: {error}"));
        }
        TransportError::Network(error.to_string())
    }
}

async fn send(
    client: Client,
    url: Url,
    api_token: Option<String>,
    body: BackendRequest,
) -> Result<DataQueryResponse, TransportError> {
    let mut builder = client.post(url).json(&body);
    if let Some(token) = api_token {
        builder = builder.bearer_auth(token);
    }

    let response = builder.send().await.map_err(|e| {
        warn!(error = %e, "query request failed");
        BackendQueryTransport::map_error(&e)
    })?;

    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| BackendQueryTransport::map_error(&e))?;

    if status.is_success() {
        return serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()));
    }

    // Query failures come back as an error status with per-target results.
    if let Ok(results) = serde_json::from_slice::<DataQueryResponse>(&bytes)
        && !results.is_empty()
    {
        debug!(status = status.as_u16(), "backend reported per-query errors");
        return Ok(results);
    }

    warn!(status = status.as_u16(), "backend rejected query");
    Err(TransportError::Status {
        status: status.as_u16(),
        message: error_message(status, &bytes),
    })
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            (!text.is_empty()).then_some(text)
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string())
}

impl QueryTransport for BackendQueryTransport {
    fn query(&self, request: QueryRequest) -> QueryResponseStream {
        let body = self.build_request_body(&request);
        let client = self.client.clone();
        let url = self.query_url.clone();
        let api_token = self.api_token.clone();

        debug!(
            request_id = %request.request_id,
            queries = body.queries.len(),
            url = %url,
            "prepared backend query"
        );

        stream::once(send(client, url, api_token, body)).boxed()
    }
}
