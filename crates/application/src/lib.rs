//! Oracle data source application layer
//!
//! Holds the query dispatch path of the plugin and the host-side use cases
//! built around it. Everything that touches the network or the filesystem
//! is reached through the traits in [`ports`].

pub mod datasource;
pub mod error;
pub mod global_scope;
pub mod ports;
pub mod use_cases;
pub mod variable_resolver;
pub mod variable_support;

#[cfg(test)]
mod test_support;

pub use datasource::{DataSource, DataSourceApi};
pub use error::{ApplicationError, ApplicationResult};
pub use global_scope::GlobalScopeTransport;
pub use variable_resolver::TemplateSrv;
pub use variable_support::{DataSourceVariableSupport, VariableSupport};
