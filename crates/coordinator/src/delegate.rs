//! Lifecycle event callbacks.

use async_trait::async_trait;
use common::{TransportOrderId, TransportUnitId};

use crate::error::Result;

/// Receives transport order lifecycle events.
///
/// Each callback is fire-and-forget for the caller: outcomes are visible
/// only through the repository afterwards. An error means the repository
/// failed; an unknown order or a refused start is not an error.
///
/// [`LifecycleCoordinator`](crate::LifecycleCoordinator) is the default
/// implementation. Other start policies are plugged in by implementing this
/// trait.
#[async_trait]
pub trait TransportOrderStateDelegate: Send + Sync {
    /// Orders were created for `transport_unit`.
    async fn after_creation(&self, transport_unit: TransportUnitId) -> Result<()>;

    /// The order with `order_id` has finished.
    async fn after_finish(&self, order_id: TransportOrderId) -> Result<()>;

    /// The order with `order_id` was canceled.
    async fn on_cancel(&self, order_id: TransportOrderId) -> Result<()>;

    /// The order with `order_id` failed.
    async fn on_failure(&self, order_id: TransportOrderId) -> Result<()>;

    /// The order with `order_id` was interrupted.
    async fn on_interrupt(&self, order_id: TransportOrderId) -> Result<()>;
}
