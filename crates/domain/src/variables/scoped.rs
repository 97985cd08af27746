//! Scoped variable values

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// The current value of a variable: a scalar or a multi-value selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    /// A single value.
    Single(String),
    /// Several selected values.
    Multi(Vec<String>),
}

impl VariableValue {
    /// Returns the values as a slice, treating a scalar as one element.
    #[must_use]
    pub fn values(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multi(values) => values,
        }
    }

    /// Returns true for a multi-value selection.
    #[must_use]
    pub const fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for VariableValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

/// A variable bound in a scope: its value plus an optional display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedVar {
    /// Human-readable text of the current selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// The value substituted into query text.
    pub value: VariableValue,
}

impl ScopedVar {
    /// Creates a scalar variable.
    #[must_use]
    pub fn single(value: impl Into<String>) -> Self {
        Self {
            text: None,
            value: VariableValue::Single(value.into()),
        }
    }

    /// Creates a multi-value variable.
    #[must_use]
    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text: None,
            value: VariableValue::Multi(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Sets the display text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A set of variables keyed by name.
///
/// Used both for the request scope and for dashboard-wide variables. The
/// resolver only ever reads from it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopedVars(HashMap<String, ScopedVar>);

impl ScopedVars {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a variable, replacing any previous binding with the same name.
    pub fn insert(&mut self, name: impl Into<String>, var: ScopedVar) -> Option<ScopedVar> {
        self.0.insert(name.into(), var)
    }

    /// Binds a variable after checking its name.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidVariableName` if the name could never be
    /// referenced from query text.
    pub fn try_insert(&mut self, name: &str, var: ScopedVar) -> DomainResult<()> {
        if !is_valid_variable_name(name) {
            return Err(DomainError::InvalidVariableName(name.to_string()));
        }
        self.0.insert(name.to_string(), var);
        Ok(())
    }

    /// Looks up a variable by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ScopedVar> {
        self.0.get(name)
    }

    /// Returns true if a variable with this name is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Removes a binding.
    pub fn remove(&mut self, name: &str) -> Option<ScopedVar> {
        self.0.remove(name)
    }

    /// Returns the number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no variable is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all bindings in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ScopedVar)> {
        self.0.iter()
    }

    /// Returns all variable names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<N: Into<String>> FromIterator<(N, ScopedVar)> for ScopedVars {
    fn from_iter<I: IntoIterator<Item = (N, ScopedVar)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(name, var)| (name.into(), var)).collect())
    }
}

/// Validates a variable name.
///
/// Names that can be referenced from query text consist of ASCII letters,
/// digits and underscores only.
#[must_use]
pub fn is_valid_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_single_value_as_slice() {
        let value = VariableValue::from("eu-west");
        assert_eq!(value.values(), ["eu-west".to_string()]);
        assert!(!value.is_multi());
    }

    #[test]
    fn test_insert_and_get() {
        let mut vars = ScopedVars::new();
        vars.insert("region", ScopedVar::single("eu"));

        assert_eq!(vars.len(), 1);
        assert!(vars.contains("region"));
        assert_eq!(
            vars.get("region").map(|v| v.value.clone()),
            Some(VariableValue::Single("eu".to_string()))
        );
    }

    #[test]
    fn test_try_insert_rejects_invalid_names() {
        let mut vars = ScopedVars::new();
        assert!(vars.try_insert("__from", ScopedVar::single("1")).is_ok());
        assert_eq!(
            vars.try_insert("bad-name", ScopedVar::single("1")),
            Err(DomainError::InvalidVariableName("bad-name".to_string()))
        );
        assert!(vars.try_insert("", ScopedVar::single("1")).is_err());
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_names_sorted() {
        let vars: ScopedVars = [
            ("b", ScopedVar::single("2")),
            ("a", ScopedVar::single("1")),
        ]
        .into_iter()
        .collect();
        assert_eq!(vars.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_host_json_shape() {
        let raw = json!({
            "__interval": { "text": "15s", "value": "15s" },
            "hosts": { "text": "db1 + db2", "value": ["db1", "db2"] }
        });

        let vars: ScopedVars = serde_json::from_value(raw).expect("valid scope");
        let hosts = vars.get("hosts").expect("hosts bound");
        assert!(hosts.value.is_multi());
        assert_eq!(hosts.text.as_deref(), Some("db1 + db2"));
        assert_eq!(
            vars.get("__interval").map(|v| v.value.values().to_vec()),
            Some(vec!["15s".to_string()])
        );
    }
}
