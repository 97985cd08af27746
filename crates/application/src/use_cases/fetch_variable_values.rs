//! Fetch variable values use case.
//!
//! Runs a variable's query through the data source and turns the returned
//! frames into the value list of a dashboard variable.

use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt;
use orads_domain::{Query, QueryRequest, ScopedVars, TimeRange, VariableSupportType};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::RunQuery;
use crate::datasource::DataSourceApi;
use crate::error::{ApplicationError, ApplicationResult};

/// Field name that selects the display text column.
const TEXT_FIELD: &str = "__text";
/// Field name that selects the value column.
const VALUE_FIELD: &str = "__value";

/// One option of a dashboard variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricFindValue {
    /// Text shown in the variable picker.
    pub text: String,
    /// Value substituted into queries.
    pub value: String,
}

/// Input for fetching variable values.
#[derive(Debug, Clone)]
pub struct FetchVariableValuesInput {
    /// The variable's query.
    pub query: Query,
    /// Dashboard time range.
    pub range: TimeRange,
    /// Variables visible to the variable query.
    pub scoped_vars: Option<ScopedVars>,
}

/// Populates a dashboard variable from the data source.
pub struct FetchVariableValues<D: ?Sized> {
    datasource: Arc<D>,
    runner: RunQuery<D>,
}

impl<D: DataSourceApi + ?Sized> FetchVariableValues<D> {
    /// Creates a new `FetchVariableValues` use case.
    #[must_use]
    pub fn new(datasource: Arc<D>) -> Self {
        Self {
            runner: RunQuery::new(Arc::clone(&datasource)),
            datasource,
        }
    }

    /// Executes the variable query and collects the distinct values.
    ///
    /// # Errors
    /// - `VariableSupportUnavailable` if the data source cannot back variables
    /// - `Transport` if the backend call fails
    /// - `Query` if the backend reports an error for the variable query
    pub async fn execute(
        &self,
        input: FetchVariableValuesInput,
    ) -> ApplicationResult<Vec<MetricFindValue>> {
        let support = self.datasource.variables().support_type();
        if support != VariableSupportType::Datasource {
            return Err(ApplicationError::VariableSupportUnavailable);
        }

        let mut request = QueryRequest::new(vec![input.query], input.range);
        request.scoped_vars = input.scoped_vars;

        let mut stream = self.runner.execute(request);
        let mut seen = HashSet::new();
        let mut values = Vec::new();

        while let Some(item) = stream.next().await {
            let response = item?;
            for (ref_id, result) in response.results {
                if let Some(message) = result.error {
                    warn!(ref_id = %ref_id, error = %message, "variable query failed");
                    return Err(ApplicationError::Query { ref_id, message });
                }
                for frame in &result.frames {
                    for value in frame_values(frame) {
                        if seen.insert(value.text.clone()) {
                            values.push(value);
                        }
                    }
                }
            }
        }

        debug!(count = values.len(), "fetched variable values");
        Ok(values)
    }
}

/// Extracts variable options from one data frame.
///
/// Frames are read in the host's JSON layout (`schema.fields` plus
/// column-major `data.values`). The `__text` and `__value` columns are used
/// when present, otherwise the first column supplies both.
fn frame_values(frame: &Value) -> Vec<MetricFindValue> {
    let Some(columns) = frame.pointer("/data/values").and_then(Value::as_array) else {
        return Vec::new();
    };

    let field_names: Vec<&str> = frame
        .pointer("/schema/fields")
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .map(|f| f.get("name").and_then(Value::as_str).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();
    let position = |name: &str| field_names.iter().position(|n| *n == name);

    let text_column = position(TEXT_FIELD).unwrap_or(0);
    let value_column = position(VALUE_FIELD).unwrap_or(text_column);

    let (Some(texts), Some(vals)) = (
        columns.get(text_column).and_then(Value::as_array),
        columns.get(value_column).and_then(Value::as_array),
    ) else {
        return Vec::new();
    };

    texts
        .iter()
        .zip(vals)
        .filter_map(|(text, value)| {
            Some(MetricFindValue {
                text: cell_to_string(text)?,
                value: cell_to_string(value)?,
            })
        })
        .collect()
}

fn cell_to_string(cell: &Value) -> Option<String> {
    match cell {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
