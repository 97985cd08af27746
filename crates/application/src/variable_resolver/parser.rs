//! Placeholder parser
//!
//! Recognises the host's interpolation syntax and reports each placeholder
//! with its position:
//!
//! - `$name`
//! - `${name}` and `${name:format}`
//! - `[[name]]` and `[[name:format]]`
//!
//! Names are made of ASCII letters, digits and underscores, so `$__from`
//! refers to the variable `__from`.

use std::ops::Range;

/// The syntax a placeholder was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderSyntax {
    /// `$name`
    Dollar,
    /// `${name}` or `${name:format}`
    Braced,
    /// `[[name]]` or `[[name:format]]`
    Brackets,
}

/// A placeholder found in query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The variable name.
    pub name: String,

    /// Format hint written after `:`, if any.
    pub format: Option<String>,

    /// How the placeholder was written.
    pub syntax: PlaceholderSyntax,

    /// Byte range in the original string where this placeholder appears.
    pub span: Range<usize>,
}

/// Parses a string and extracts all placeholders, in order of appearance.
///
/// # Examples
///
/// ```
/// use orads_application::variable_resolver::parser::parse_variables;
///
/// let refs = parse_variables("SELECT * FROM t WHERE d BETWEEN $__from AND ${__to}");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].name, "__from");
/// assert_eq!(refs[1].name, "__to");
/// ```
#[must_use]
pub fn parse_variables(input: &str) -> Vec<VariableReference> {
    let bytes = input.as_bytes();
    let mut references = Vec::new();
    let mut index = 0;

    while index < bytes.len() {
        let parsed = match bytes[index] {
            b'$' => parse_dollar(input, index),
            b'[' => parse_brackets(input, index),
            _ => None,
        };

        match parsed {
            Some(reference) => {
                index = reference.span.end;
                references.push(reference);
            }
            None => index += 1,
        }
    }

    references
}

/// Returns true if the input contains at least one placeholder.
#[must_use]
pub fn has_variables(input: &str) -> bool {
    (input.contains('$') || input.contains("[[")) && !parse_variables(input).is_empty()
}

/// Extracts just the variable names, in order of appearance.
#[must_use]
pub fn extract_variable_names(input: &str) -> Vec<String> {
    parse_variables(input)
        .into_iter()
        .map(|r| r.name)
        .collect()
}

fn word_len(input: &str) -> usize {
    input
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count()
}

fn parse_dollar(input: &str, start: usize) -> Option<VariableReference> {
    let rest = &input[start + 1..];

    if let Some(inner) = rest.strip_prefix('{') {
        let name_len = word_len(inner);
        if name_len == 0 {
            return None;
        }
        let name = &inner[..name_len];
        let after_name = &inner[name_len..];

        let (format, consumed) = if after_name.starts_with('}') {
            (None, name_len + 1)
        } else if let Some(format_part) = after_name.strip_prefix(':') {
            let format_len = format_part.find('}')?;
            if format_len == 0 {
                return None;
            }
            (Some(&format_part[..format_len]), name_len + 1 + format_len + 1)
        } else {
            return None;
        };

        // `$` + `{` + consumed
        let end = start + 2 + consumed;
        return Some(VariableReference {
            name: name.to_string(),
            format: format.map(str::to_string),
            syntax: PlaceholderSyntax::Braced,
            span: start..end,
        });
    }

    let name_len = word_len(rest);
    if name_len == 0 {
        return None;
    }
    Some(VariableReference {
        name: rest[..name_len].to_string(),
        format: None,
        syntax: PlaceholderSyntax::Dollar,
        span: start..start + 1 + name_len,
    })
}

fn parse_brackets(input: &str, start: usize) -> Option<VariableReference> {
    let inner = input[start..].strip_prefix("[[")?;
    let name_len = word_len(inner);
    if name_len == 0 {
        return None;
    }
    let name = &inner[..name_len];
    let after_name = &inner[name_len..];

    let (format, consumed) = if let Some(format_part) = after_name.strip_prefix(':') {
        let format_len = word_len(format_part);
        if format_len == 0 || !format_part[format_len..].starts_with("]]") {
            return None;
        }
        (Some(&format_part[..format_len]), name_len + 1 + format_len + 2)
    } else if after_name.starts_with("]]") {
        (None, name_len + 2)
    } else {
        return None;
    };

    Some(VariableReference {
        name: name.to_string(),
        format: format.map(str::to_string),
        syntax: PlaceholderSyntax::Brackets,
        span: start..start + 2 + consumed,
    })
}
