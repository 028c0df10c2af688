//! Coordinator error types.

use common::TransportOrderId;
use domain::TransportOrderError;
use order_store::OrderStoreError;
use thiserror::Error;

/// Errors that can occur while handling lifecycle events.
///
/// Missing orders and refused starts are normal outcomes of the coordinator
/// and never show up here; only the service layer reports `OrderNotFound`.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Order repository error.
    #[error("Order store error: {0}")]
    OrderStore(#[from] OrderStoreError),

    /// The requested transition is not allowed.
    #[error("Transport order error: {0}")]
    TransportOrder(#[from] TransportOrderError),

    /// Order not found.
    #[error("Transport order not found: {0}")]
    OrderNotFound(TransportOrderId),

    /// The order changed between reading and writing it.
    #[error("Transport order {0} was modified concurrently")]
    ConcurrentModification(TransportOrderId),
}

/// Convenience type alias for coordinator results.
pub type Result<T> = std::result::Result<T, CoordinatorError>;
