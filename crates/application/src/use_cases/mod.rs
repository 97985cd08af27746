//! Application use cases (host-side orchestration around the data source).

mod check_health;
mod fetch_variable_values;
mod preview_query;
mod run_query;
mod update_settings;

pub use check_health::*;
pub use fetch_variable_values::*;
pub use preview_query::*;
pub use run_query::*;
pub use update_settings::*;
