//! Template variable resolution
//!
//! Provides parsing and resolution of the host's placeholder syntax
//! (`$var`, `${var:format}`, `[[var]]`).
//!
//! # Usage
//!
//! ```
//! use orads_application::ports::TemplateResolver;
//! use orads_application::variable_resolver::TemplateSrv;
//! use orads_domain::{ScopedVar, ScopedVars};
//!
//! let mut srv = TemplateSrv::new();
//! srv.set_variable("table", ScopedVar::single("orders"));
//!
//! let mut scoped = ScopedVars::new();
//! scoped.insert("region", ScopedVar::multi(["eu", "us"]));
//!
//! let sql = srv.replace("SELECT * FROM $table WHERE r IN (${region:sqlstring})", Some(&scoped));
//! assert_eq!(sql, "SELECT * FROM orders WHERE r IN ('eu','us')");
//! ```

pub mod engine;
pub mod parser;

pub use engine::{ResolutionResult, ResolvedVariable, TemplateSrv, VariableOrigin};
pub use parser::{
    PlaceholderSyntax, VariableReference, extract_variable_names, has_variables, parse_variables,
};
