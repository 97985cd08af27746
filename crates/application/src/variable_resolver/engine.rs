//! Template resolution engine
//!
//! Substitutes placeholders using request-scoped variables first, then the
//! dashboard variables the engine was configured with, then the dashboard
//! time range (`__from`, `__to`).

use orads_domain::{ScopedVar, ScopedVars, TimeRange, VariableFormat};
use tracing::debug;

use super::parser::{VariableReference, extract_variable_names, parse_variables};
use crate::ports::TemplateResolver;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableOrigin {
    /// The request's scoped variables.
    Request,
    /// Dashboard-wide variables.
    Dashboard,
    /// The dashboard time range.
    TimeRange,
}

/// A placeholder that was substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariable {
    /// Variable name.
    pub name: String,
    /// The formatted text written in place of the placeholder.
    pub value: String,
    /// Which scope supplied the value.
    pub origin: VariableOrigin,
}

/// Result of variable resolution for a string.
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// The string with all resolvable placeholders substituted.
    pub resolved: String,

    /// Placeholders that were substituted, in order of appearance.
    pub resolved_variables: Vec<ResolvedVariable>,

    /// Names of placeholders left untouched.
    pub unresolved: Vec<String>,

    /// Whether every placeholder was substituted.
    pub is_complete: bool,
}

impl ResolutionResult {
    /// Creates a result for input with no placeholders.
    #[must_use]
    pub fn no_variables(input: &str) -> Self {
        Self {
            resolved: input.to_string(),
            resolved_variables: Vec::new(),
            unresolved: Vec::new(),
            is_complete: true,
        }
    }
}

/// In-process template engine.
///
/// Holds the dashboard variables and time range. Resolution is a single pass
/// over the input: substituted values are never scanned again, so a value
/// that itself looks like a placeholder is written verbatim.
#[derive(Debug, Clone, Default)]
pub struct TemplateSrv {
    variables: ScopedVars,
    time_range: Option<TimeRange>,
}

impl TemplateSrv {
    /// Creates an engine with no dashboard variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given dashboard variables.
    #[must_use]
    pub fn with_variables(variables: ScopedVars) -> Self {
        Self {
            variables,
            time_range: None,
        }
    }

    /// Sets the dashboard time range exposed as `__from` and `__to`.
    #[must_use]
    pub const fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    /// Binds a dashboard variable.
    pub fn set_variable(&mut self, name: impl Into<String>, var: ScopedVar) {
        self.variables.insert(name, var);
    }

    /// Replaces the dashboard time range.
    pub const fn set_time_range(&mut self, range: TimeRange) {
        self.time_range = Some(range);
    }

    /// Returns the dashboard variables.
    #[must_use]
    pub const fn variables(&self) -> &ScopedVars {
        &self.variables
    }

    /// Resolves all placeholders in the input.
    #[must_use]
    pub fn resolve(&self, input: &str, scoped_vars: Option<&ScopedVars>) -> ResolutionResult {
        let references = parse_variables(input);

        if references.is_empty() {
            return ResolutionResult::no_variables(input);
        }

        let mut resolved_vars = Vec::new();
        let mut unresolved = Vec::new();
        let mut result = String::with_capacity(input.len());
        let mut last_end = 0;

        for var_ref in &references {
            result.push_str(&input[last_end..var_ref.span.start]);

            if let Some(resolved) = self.resolve_reference(var_ref, scoped_vars) {
                result.push_str(&resolved.value);
                resolved_vars.push(resolved);
            } else {
                result.push_str(&input[var_ref.span.clone()]);
                unresolved.push(var_ref.name.clone());
            }

            last_end = var_ref.span.end;
        }

        result.push_str(&input[last_end..]);

        if !unresolved.is_empty() {
            debug!(unresolved = ?unresolved, "placeholders left unresolved");
        }

        let is_complete = unresolved.is_empty();
        ResolutionResult {
            resolved: result,
            resolved_variables: resolved_vars,
            unresolved,
            is_complete,
        }
    }

    /// Lists the placeholders in the input that no scope can resolve.
    #[must_use]
    pub fn find_unresolved(&self, input: &str, scoped_vars: Option<&ScopedVars>) -> Vec<String> {
        extract_variable_names(input)
            .into_iter()
            .filter(|name| self.lookup(name, scoped_vars).is_none())
            .collect()
    }

    /// Returns true if the input references a variable this engine knows.
    #[must_use]
    pub fn contains_template(&self, input: &str) -> bool {
        parse_variables(input)
            .iter()
            .any(|r| self.lookup(&r.name, None).is_some())
    }

    fn resolve_reference(
        &self,
        var_ref: &VariableReference,
        scoped_vars: Option<&ScopedVars>,
    ) -> Option<ResolvedVariable> {
        let (var, origin) = self.lookup(&var_ref.name, scoped_vars)?;

        let format = match var_ref.format.as_deref() {
            Some(name) => VariableFormat::from_name(name).unwrap_or_else(|| {
                debug!(format = name, variable = %var_ref.name, "unknown format, using default");
                VariableFormat::default()
            }),
            None => VariableFormat::default(),
        };

        Some(ResolvedVariable {
            name: var_ref.name.clone(),
            value: format.apply(&var),
            origin,
        })
    }

    fn lookup(
        &self,
        name: &str,
        scoped_vars: Option<&ScopedVars>,
    ) -> Option<(ScopedVar, VariableOrigin)> {
        if let Some(var) = scoped_vars.and_then(|vars| vars.get(name)) {
            return Some((var.clone(), VariableOrigin::Request));
        }
        if let Some(var) = self.variables.get(name) {
            return Some((var.clone(), VariableOrigin::Dashboard));
        }

        let range = self.time_range?;
        let millis = match name {
            "__from" => range.from_ms(),
            "__to" => range.to_ms(),
            _ => return None,
        };
        Some((ScopedVar::single(millis.to_string()), VariableOrigin::TimeRange))
    }
}

impl TemplateResolver for TemplateSrv {
    fn replace(&self, text: &str, scoped_vars: Option<&ScopedVars>) -> String {
        self.resolve(text, scoped_vars).resolved
    }
}
