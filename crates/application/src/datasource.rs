//! Oracle data source
//!
//! The front-end half of the plugin: shapes each query request before it is
//! handed to the backend.
//!
//! - Template variables are resolved per target, and only when the request
//!   carries a non-empty variable scope. Without one, targets are forwarded
//!   untouched so a later pass can resolve them against the full dashboard
//!   scope.
//! - Targets are never modified in place; the request gets a fresh target
//!   list of resolved copies.
//! - Transport results and failures are returned exactly as produced.

use std::sync::Arc;

use orads_domain::{DataSourceSettings, Query, QueryRequest, ScopedVars};
use tracing::debug;

use crate::ports::{QueryResponseStream, QueryTransport, TemplateResolver};
use crate::variable_support::{DataSourceVariableSupport, VariableSupport};

/// Interface the host holds for a data source instance.
pub trait DataSourceApi: Send + Sync {
    /// Returns a copy of `query` with its SQL resolved against `scoped_vars`.
    ///
    /// An empty scope yields an identical copy.
    fn apply_template_variables(&self, query: &Query, scoped_vars: &ScopedVars) -> Query;

    /// Returns true if the query should be sent to the backend.
    fn filter_query(&self, query: &Query) -> bool;

    /// Returns the variable support declaration.
    fn variables(&self) -> &dyn VariableSupport;

    /// Dispatches the request and returns the transport's response stream.
    fn query(&self, request: QueryRequest) -> QueryResponseStream;

    /// Returns the query a new editor starts from.
    fn default_query(&self) -> Query {
        Query::default()
    }
}

/// Data source instance wired to a template resolver and a query transport.
pub struct DataSource<R, T> {
    uid: String,
    name: String,
    resolver: Arc<R>,
    transport: Arc<T>,
    variables: DataSourceVariableSupport,
}

impl<R: TemplateResolver, T: QueryTransport> DataSource<R, T> {
    /// Creates a data source for the given instance settings.
    #[must_use]
    pub fn new(settings: &DataSourceSettings, resolver: Arc<R>, transport: Arc<T>) -> Self {
        Self {
            uid: settings.uid.clone(),
            name: settings.name.clone(),
            resolver,
            transport,
            variables: DataSourceVariableSupport::new(),
        }
    }

    /// Returns the instance uid.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Returns the instance display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<R: TemplateResolver, T: QueryTransport> DataSourceApi for DataSource<R, T> {
    fn apply_template_variables(&self, query: &Query, scoped_vars: &ScopedVars) -> Query {
        if scoped_vars.is_empty() {
            return query.clone();
        }

        Query {
            sql: query
                .sql
                .as_deref()
                .map(|sql| self.resolver.replace(sql, Some(scoped_vars))),
            ..query.clone()
        }
    }

    fn filter_query(&self, query: &Query) -> bool {
        query.sql().is_some_and(|sql| !sql.is_empty())
    }

    fn variables(&self) -> &dyn VariableSupport {
        &self.variables
    }

    fn query(&self, mut request: QueryRequest) -> QueryResponseStream {
        if let Some(scoped_vars) = request.non_empty_scoped_vars() {
            let targets: Vec<Query> = request
                .targets
                .iter()
                .map(|target| self.apply_template_variables(target, scoped_vars))
                .collect();
            debug!(
                datasource = %self.uid,
                request_id = %request.request_id,
                targets = targets.len(),
                variables = scoped_vars.len(),
                "resolved template variables"
            );
            request.targets = targets;
        }

        debug!(
            datasource = %self.uid,
            request_id = %request.request_id,
            targets = request.targets.len(),
            "dispatching query"
        );
        self.transport.query(request)
    }
}
