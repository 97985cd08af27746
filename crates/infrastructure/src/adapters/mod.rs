//! Adapters implementing application ports.

mod backend_transport;

pub use backend_transport::{BackendConfig, BackendQueryTransport, BackendRequest};
