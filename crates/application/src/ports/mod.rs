//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the plugin core and the host. The host
//! owns variable interpolation, query execution and settings storage; each is
//! reached through a trait so tests can substitute fakes.

mod query_transport;
mod settings_repository;
mod template_resolver;

pub use query_transport::{QueryResponseStream, QueryTransport, TransportError};
pub use settings_repository::{SettingsError, SettingsRepository};
pub use template_resolver::TemplateResolver;
