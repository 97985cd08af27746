//! Template resolver port

use orads_domain::ScopedVars;

/// Replaces template placeholders in query text.
///
/// Placeholders that cannot be resolved are left in the text exactly as
/// written; implementations never fail.
pub trait TemplateResolver: Send + Sync {
    /// Returns `text` with every recognised placeholder replaced.
    ///
    /// `scoped_vars` take precedence over any variables the resolver already
    /// knows about. With `None`, only those broader variables are used.
    fn replace(&self, text: &str, scoped_vars: Option<&ScopedVars>) -> String;
}
