//! Run query use case.

use std::sync::Arc;

use futures::{StreamExt, future, stream};
use orads_domain::{DataQueryResponse, QueryRequest};
use tracing::{debug, info};

use crate::datasource::DataSourceApi;
use crate::ports::QueryResponseStream;

/// Runs a query request the way the host's query runner does.
///
/// Hidden targets and targets the data source rejects are dropped before
/// dispatch. When nothing is left the data source is never called. The
/// dashboard-scope pass the host applies afterwards lives in the data
/// source's transport, see [`GlobalScopeTransport`](crate::GlobalScopeTransport).
pub struct RunQuery<D: ?Sized> {
    datasource: Arc<D>,
}

impl<D: DataSourceApi + ?Sized> RunQuery<D> {
    /// Creates a new `RunQuery` use case.
    #[must_use]
    pub const fn new(datasource: Arc<D>) -> Self {
        Self { datasource }
    }

    /// Filters the request's targets and dispatches what remains.
    ///
    /// # Returns
    /// The data source's response stream, or a stream with a single empty
    /// response when every target was filtered out.
    pub fn execute(&self, mut request: QueryRequest) -> QueryResponseStream {
        let total = request.targets.len();
        request
            .targets
            .retain(|target| !target.is_hidden() && self.datasource.filter_query(target));
        let skipped = total - request.targets.len();

        if request.targets.is_empty() {
            debug!(
                request_id = %request.request_id,
                skipped,
                "no executable targets, skipping dispatch"
            );
            return stream::once(future::ready(Ok(DataQueryResponse::empty()))).boxed();
        }

        info!(
            request_id = %request.request_id,
            targets = request.targets.len(),
            skipped,
            "running query"
        );
        self.datasource.query(request)
    }
}
