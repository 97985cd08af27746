//! Preview query use case.

use std::sync::Arc;

use crate::ports::TemplateResolver;
use crate::variable_resolver::has_variables;

/// Computes the resolved SQL shown next to the query editor.
///
/// Unlike dispatch, the preview always resolves, using only the variables
/// the resolver already knows. It is recomputed from the raw text on every
/// edit and holds no state of its own.
pub struct PreviewQuery<R: ?Sized> {
    resolver: Arc<R>,
}

impl<R: TemplateResolver + ?Sized> PreviewQuery<R> {
    /// Creates a new `PreviewQuery` use case.
    #[must_use]
    pub const fn new(resolver: Arc<R>) -> Self {
        Self { resolver }
    }

    /// Returns the preview for the raw editor text.
    #[must_use]
    pub fn execute(&self, raw_sql: &str) -> String {
        if !has_variables(raw_sql) {
            return raw_sql.to_string();
        }
        self.resolver.replace(raw_sql, None)
    }
}
