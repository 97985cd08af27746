//! Template variable types
//!
//! Variables live in two places: dashboard-wide variables owned by the host and
//! request-scoped variables attached to a single query request. Both are
//! represented as [`ScopedVars`].

mod format;
mod scoped;
mod support;

pub use format::VariableFormat;
pub use scoped::{ScopedVar, ScopedVars, VariableValue, is_valid_variable_name};
pub use support::VariableSupportType;
