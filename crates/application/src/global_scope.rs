//! Dashboard-scope interpolation at the backend boundary.
//!
//! The host resolves every outgoing target against its dashboard variables
//! and time range once the data source has shaped the request. Placeholders
//! the data source left alone (no request scope, or names the scope does not
//! bind) are resolved here; anything still unknown stays literal.

use std::sync::Arc;

use orads_domain::QueryRequest;
use tracing::debug;

use crate::ports::{QueryResponseStream, QueryTransport, TemplateResolver};

/// Transport wrapper that resolves each target's SQL against the global
/// scope before handing the request on.
pub struct GlobalScopeTransport<R: ?Sized, T: ?Sized> {
    resolver: Arc<R>,
    inner: Arc<T>,
}

impl<R: TemplateResolver + ?Sized, T: QueryTransport + ?Sized> GlobalScopeTransport<R, T> {
    /// Wraps `inner` with a pass over `resolver`'s global scope.
    #[must_use]
    pub const fn new(resolver: Arc<R>, inner: Arc<T>) -> Self {
        Self { resolver, inner }
    }
}

impl<R: TemplateResolver + ?Sized, T: QueryTransport + ?Sized> QueryTransport
    for GlobalScopeTransport<R, T>
{
    fn query(&self, mut request: QueryRequest) -> QueryResponseStream {
        request.targets = request
            .targets
            .into_iter()
            .map(|mut target| {
                target.sql = target.sql.map(|sql| self.resolver.replace(&sql, None));
                target
            })
            .collect();

        debug!(
            request_id = %request.request_id,
            targets = request.targets.len(),
            "applied dashboard scope"
        );
        self.inner.query(request)
    }
}
