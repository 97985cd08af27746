//! Oracle data source domain - Core plugin types
//!
//! This crate defines the data model shared by the query editor, the query
//! dispatch path and the configuration form. All types here are pure Rust
//! with no I/O dependencies.

pub mod error;
pub mod id;
pub mod query;
pub mod request;
pub mod settings;
pub mod variables;

pub use error::{DomainError, DomainResult};
pub use id::generate_request_id;
pub use query::{DataSourceRef, Query};
pub use request::{DataQueryResponse, DataResponse, QueryRequest, TimeRange};
pub use settings::{
    ConfigEdit, DataSourceOptions, DataSourceSettings, PASSWORD_FIELD, PluginSettings,
    PoolDuration, SecretPluginSettings, SecretUpdate, SecureJsonData,
};
pub use variables::{ScopedVar, ScopedVars, VariableFormat, VariableSupportType, VariableValue};
