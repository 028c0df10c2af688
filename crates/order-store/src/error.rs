use thiserror::Error;

use crate::{TransportOrderId, TransportUnitId};

/// Errors that can occur when interacting with the order repository.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    /// The order does not exist.
    #[error("Transport order not found: {0}")]
    OrderNotFound(TransportOrderId),

    /// An order with the same ID has already been stored.
    #[error("Transport order already exists: {0}")]
    DuplicateOrder(TransportOrderId),

    /// The transport unit already has a `Started` or `Interrupted` order.
    #[error("Transport unit already has an active order: {0}")]
    UnitOccupied(TransportUnitId),

    /// A stored value could not be mapped back to the domain model.
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// The backend refused to serve the request.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for order repository operations.
pub type Result<T> = std::result::Result<T, OrderStoreError>;
