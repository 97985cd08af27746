//! Variable support capability

use serde::{Deserialize, Serialize};

/// How a data source takes part in dashboard variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableSupportType {
    /// Variable queries are plain strings handled by the data source.
    Standard,
    /// The data source ships its own variable query editor and runner.
    Custom,
    /// The data source's regular query path populates variable values.
    Datasource,
}

impl VariableSupportType {
    /// Returns the identifier used by the host.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Custom => "custom",
            Self::Datasource => "datasource",
        }
    }
}

impl std::fmt::Display for VariableSupportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
