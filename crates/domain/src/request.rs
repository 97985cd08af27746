//! Query request and response types
//!
//! A request bundles every target of a panel (or a variable refresh) together
//! with the request-level variable scope and the dashboard time range.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::generate_request_id;
use crate::query::Query;
use crate::variables::ScopedVars;

/// Absolute time range of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start of the range (inclusive).
    pub from: DateTime<Utc>,
    /// End of the range (inclusive).
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a range from explicit bounds.
    #[must_use]
    pub const fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Creates a range ending now and spanning `span` into the past.
    #[must_use]
    pub fn last(span: TimeDelta) -> Self {
        let to = Utc::now();
        Self { from: to - span, to }
    }

    /// Start of the range as epoch milliseconds.
    #[must_use]
    pub fn from_ms(&self) -> i64 {
        self.from.timestamp_millis()
    }

    /// End of the range as epoch milliseconds.
    #[must_use]
    pub fn to_ms(&self) -> i64 {
        self.to.timestamp_millis()
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::last(TimeDelta::hours(6))
    }
}

/// A query request as built by the host.
///
/// Target order is significant: responses are matched back to targets by
/// `ref_id` and the host renders them in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Identifier of this request, used for logging and cancellation.
    pub request_id: String,

    /// The query targets, in request order.
    pub targets: Vec<Query>,

    /// Request-level variable scope. May be absent or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoped_vars: Option<ScopedVars>,

    /// Dashboard time range.
    pub range: TimeRange,

    /// Suggested interval between data points, in milliseconds.
    #[serde(default)]
    pub interval_ms: u64,

    /// Maximum number of data points the panel can display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_data_points: Option<u32>,
}

impl QueryRequest {
    /// Creates a request with a fresh id and no scoped variables.
    #[must_use]
    pub fn new(targets: Vec<Query>, range: TimeRange) -> Self {
        Self {
            request_id: generate_request_id(),
            targets,
            scoped_vars: None,
            range,
            interval_ms: 0,
            max_data_points: None,
        }
    }

    /// Sets the request-level variable scope.
    #[must_use]
    pub fn with_scoped_vars(mut self, scoped_vars: ScopedVars) -> Self {
        self.scoped_vars = Some(scoped_vars);
        self
    }

    /// Returns the scoped variables if they are present and non-empty.
    #[must_use]
    pub fn non_empty_scoped_vars(&self) -> Option<&ScopedVars> {
        self.scoped_vars.as_ref().filter(|vars| !vars.is_empty())
    }
}

/// Result of a single target.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataResponse {
    /// Data frames in the host's frame JSON encoding.
    #[serde(default)]
    pub frames: Vec<Value>,

    /// Error reported by the backend for this target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Backend status code for this target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl DataResponse {
    /// Returns true if the backend reported an error for this target.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Results of a request keyed by target `ref_id`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataQueryResponse {
    /// Per-target results.
    #[serde(default)]
    pub results: BTreeMap<String, DataResponse>,
}

impl DataQueryResponse {
    /// A response with no results.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the result for the given ref id.
    #[must_use]
    pub fn get(&self, ref_id: &str) -> Option<&DataResponse> {
        self.results.get(ref_id)
    }

    /// Returns true if there are no results.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::variables::ScopedVar;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_time_range_millis() {
        let from = DateTime::from_timestamp_millis(100).expect("valid");
        let to = DateTime::from_timestamp_millis(200).expect("valid");
        let range = TimeRange::new(from, to);
        assert_eq!(range.from_ms(), 100);
        assert_eq!(range.to_ms(), 200);
    }

    #[test]
    fn test_last_range_ends_after_start() {
        let range = TimeRange::last(TimeDelta::minutes(5));
        assert_eq!(range.to - range.from, TimeDelta::minutes(5));
    }

    #[test]
    fn test_non_empty_scoped_vars() {
        let request = QueryRequest::new(vec![], TimeRange::default());
        assert!(request.non_empty_scoped_vars().is_none());

        let request = request.with_scoped_vars(ScopedVars::new());
        assert!(request.non_empty_scoped_vars().is_none());

        let mut vars = ScopedVars::new();
        vars.insert("region", ScopedVar::single("eu"));
        let request = request.with_scoped_vars(vars);
        assert!(request.non_empty_scoped_vars().is_some());
    }

    #[test]
    fn test_response_deserialization() {
        let raw = json!({
            "results": {
                "A": { "frames": [{ "schema": {}, "data": {} }], "status": 200 },
                "B": { "error": "ORA-00942: table or view does not exist", "status": 400 }
            }
        });

        let response: DataQueryResponse = serde_json::from_value(raw).expect("valid");
        assert_eq!(response.results.len(), 2);
        assert!(!response.get("A").expect("A").is_error());
        assert!(response.get("B").expect("B").is_error());
    }
}
