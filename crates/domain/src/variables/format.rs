//! Variable value formatting
//!
//! A placeholder may carry a format hint (`${var:sqlstring}`) that controls how
//! the value, and especially a multi-value selection, is written into SQL.

use super::scoped::{ScopedVar, VariableValue};

/// Formatting applied when a variable value is substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VariableFormat {
    /// `{a,b}` for several values, the bare value otherwise.
    #[default]
    Glob,
    /// Values joined with `,`.
    Csv,
    /// Values joined with `|`.
    Pipe,
    /// Values written as-is, joined with `,`.
    Raw,
    /// SQL string literals: `'a','b'` with `'` doubled.
    SqlString,
    /// Single-quoted values: `'a','b'` with `'` backslash-escaped.
    SingleQuote,
    /// Double-quoted values: `"a","b"` with `"` backslash-escaped.
    DoubleQuote,
    /// JSON string or JSON array of strings.
    Json,
    /// The display text of the selection instead of its value.
    Text,
}

impl VariableFormat {
    /// Looks up a format by the name used in placeholders.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let format = match name {
            "glob" => Self::Glob,
            "csv" => Self::Csv,
            "pipe" => Self::Pipe,
            "raw" => Self::Raw,
            "sqlstring" => Self::SqlString,
            "singlequote" => Self::SingleQuote,
            "doublequote" => Self::DoubleQuote,
            "json" => Self::Json,
            "text" => Self::Text,
            _ => return None,
        };
        Some(format)
    }

    /// Returns the name used in placeholders.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Glob => "glob",
            Self::Csv => "csv",
            Self::Pipe => "pipe",
            Self::Raw => "raw",
            Self::SqlString => "sqlstring",
            Self::SingleQuote => "singlequote",
            Self::DoubleQuote => "doublequote",
            Self::Json => "json",
            Self::Text => "text",
        }
    }

    /// Renders a variable according to this format.
    #[must_use]
    pub fn apply(&self, var: &ScopedVar) -> String {
        let values = var.value.values();
        match self {
            Self::Glob => match values {
                [] => String::new(),
                [single] => single.clone(),
                many => format!("{{{}}}", many.join(",")),
            },
            Self::Csv | Self::Raw => values.join(","),
            Self::Pipe => values.join("|"),
            Self::SqlString => quote_all(values, '\'', "''"),
            Self::SingleQuote => quote_all(values, '\'', "\\'"),
            Self::DoubleQuote => quote_all(values, '"', "\\\""),
            Self::Json => match &var.value {
                VariableValue::Single(value) => serde_json::Value::from(value.as_str()).to_string(),
                VariableValue::Multi(values) => serde_json::Value::from(values.clone()).to_string(),
            },
            Self::Text => var.text.clone().unwrap_or_else(|| values.join(" + ")),
        }
    }
}

impl std::fmt::Display for VariableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn quote_all(values: &[String], quote: char, escaped: &str) -> String {
    values
        .iter()
        .map(|value| format!("{quote}{}{quote}", value.replace(quote, escaped)))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hosts() -> ScopedVar {
        ScopedVar::multi(["db1", "db2"])
    }

    #[test]
    fn test_glob_default() {
        assert_eq!(VariableFormat::default(), VariableFormat::Glob);
        assert_eq!(VariableFormat::Glob.apply(&hosts()), "{db1,db2}");
        assert_eq!(VariableFormat::Glob.apply(&ScopedVar::single("db1")), "db1");
        assert_eq!(VariableFormat::Glob.apply(&ScopedVar::multi(["db1"])), "db1");
    }

    #[test]
    fn test_joined_formats() {
        assert_eq!(VariableFormat::Csv.apply(&hosts()), "db1,db2");
        assert_eq!(VariableFormat::Pipe.apply(&hosts()), "db1|db2");
        assert_eq!(VariableFormat::Raw.apply(&hosts()), "db1,db2");
    }

    #[test]
    fn test_sqlstring_escapes_quotes() {
        let var = ScopedVar::multi(["O'Brien", "Smith"]);
        assert_eq!(VariableFormat::SqlString.apply(&var), "'O''Brien','Smith'");
        assert_eq!(
            VariableFormat::SqlString.apply(&ScopedVar::single("x")),
            "'x'"
        );
    }

    #[test]
    fn test_quote_formats() {
        let var = ScopedVar::multi(["a'b", "c\"d"]);
        assert_eq!(VariableFormat::SingleQuote.apply(&var), r#"'a\'b','c"d'"#);
        assert_eq!(VariableFormat::DoubleQuote.apply(&var), r#""a'b","c\"d""#);
    }

    #[test]
    fn test_json_format() {
        assert_eq!(VariableFormat::Json.apply(&hosts()), r#"["db1","db2"]"#);
        assert_eq!(VariableFormat::Json.apply(&ScopedVar::single("a")), r#""a""#);
    }

    #[test]
    fn test_text_format() {
        let var = hosts().with_text("All hosts");
        assert_eq!(VariableFormat::Text.apply(&var), "All hosts");
        assert_eq!(VariableFormat::Text.apply(&hosts()), "db1 + db2");
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            VariableFormat::from_name("sqlstring"),
            Some(VariableFormat::SqlString)
        );
        assert_eq!(VariableFormat::from_name("lucene"), None);
        for format in [VariableFormat::Csv, VariableFormat::Json, VariableFormat::Text] {
            assert_eq!(VariableFormat::from_name(format.as_str()), Some(format));
        }
    }
}
