//! HTTP route handlers.

pub mod health;
pub mod location_groups;
pub mod metrics;
pub mod transport_orders;

use uuid::Uuid;

use crate::error::ApiError;

/// Parses a path segment as a UUID.
pub(crate) fn parse_uuid(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}
