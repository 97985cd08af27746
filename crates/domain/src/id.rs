//! Request identifier generation.

use uuid::Uuid;

/// Generates an identifier for a query request.
///
/// UUID v7 keeps identifiers time-ordered, which makes request logs sortable.
#[must_use]
pub fn generate_request_id() -> String {
    Uuid::now_v7().to_string()
}
