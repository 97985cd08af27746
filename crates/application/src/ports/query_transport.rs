//! Query transport port

use futures::stream::BoxStream;
use orads_domain::{DataQueryResponse, QueryRequest};

/// Stream of responses produced by the transport for one request.
///
/// The stream is cold: nothing is sent until it is polled, and dropping it
/// cancels the request.
pub type QueryResponseStream = BoxStream<'static, Result<DataQueryResponse, TransportError>>;

/// Errors reported by the query transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The backend could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The backend response could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The request was cancelled before completion.
    #[error("request cancelled")]
    Cancelled,
}

/// Port for executing query requests against the backend.
pub trait QueryTransport: Send + Sync {
    /// Sends the request and returns its response stream.
    ///
    /// Must not block or perform I/O before the stream is polled.
    fn query(&self, request: QueryRequest) -> QueryResponseStream;
}
