//! Query model
//!
//! A query target as edited in the query editor and replayed by the host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reference to the data source instance a query belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataSourceRef {
    /// Unique identifier of the data source instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// Plugin type identifier.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub plugin_type: Option<String>,
}

impl DataSourceRef {
    /// Creates a reference to the data source with the given uid.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            plugin_type: None,
        }
    }
}

/// A single query target.
///
/// Only `sql` is owned by this plugin. Everything else is assigned by the host
/// and forwarded as received, including unknown fields kept in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Host-assigned identifier, unique within a request.
    #[serde(default)]
    pub ref_id: String,

    /// Raw SQL text, possibly containing template placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,

    /// Whether the user hid this target in the editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,

    /// The data source this target is bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<DataSourceRef>,

    /// Host-defined metadata (`intervalMs`, `maxDataPoints`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Query {
    /// Creates an empty query with the given ref id.
    #[must_use]
    pub fn new(ref_id: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            ..Self::default()
        }
    }

    /// Creates a query carrying SQL text.
    #[must_use]
    pub fn with_sql(ref_id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            sql: Some(sql.into()),
            ..Self::default()
        }
    }

    /// Returns the SQL text, if any.
    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }

    /// Returns true if the target was hidden by the user.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hide.unwrap_or(false)
    }
}
