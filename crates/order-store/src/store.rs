use async_trait::async_trait;
use domain::{TransportOrder, TransportOrderState};

use crate::{LocationGroupId, OrderQuery, Result, TransportOrderId, TransportUnitId};

/// Outcome of an atomic exclusive start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusiveStart {
    /// The order is now `Started`.
    Started,

    /// Another order already owns the transport unit. The owner is unknown
    /// when the conflict was only detected by a storage constraint.
    Conflict { active: Option<TransportOrderId> },

    /// The order was no longer in one of the expected states.
    StateChanged { actual: TransportOrderState },
}

/// Core trait for transport order repositories.
///
/// Implementations must be thread-safe (Send + Sync). Conditional updates
/// (`compare_and_set_state`, `start_exclusive`) are atomic: concurrent
/// callers never both observe the precondition and both apply the change.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Stores a new order.
    ///
    /// A target location group that is not known yet is registered along
    /// with the order; a known group keeps its stored infeed flag.
    async fn insert(&self, order: TransportOrder) -> Result<()>;

    /// Retrieves an order by ID.
    ///
    /// Returns None if the order doesn't exist.
    async fn find_by_id(&self, id: TransportOrderId) -> Result<Option<TransportOrder>>;

    /// Retrieves orders matching a query, sorted by `query.ordering`.
    async fn find(&self, query: OrderQuery) -> Result<Vec<TransportOrder>>;

    /// Moves an order from `expected` to `new` if it is still in `expected`.
    ///
    /// Returns false when the order is in another state. Fails with
    /// `OrderNotFound` if the order doesn't exist.
    async fn compare_and_set_state(
        &self,
        id: TransportOrderId,
        expected: TransportOrderState,
        new: TransportOrderState,
    ) -> Result<bool>;

    /// Marks an order `Started` if it is in one of `expected` and no other
    /// order on its transport unit is `Started` or `Interrupted`.
    ///
    /// The check and the update happen as one step per transport unit.
    async fn start_exclusive(
        &self,
        id: TransportOrderId,
        expected: &[TransportOrderState],
    ) -> Result<ExclusiveStart>;

    /// Sets the infeed flag of a location group.
    ///
    /// Returns false if the group is unknown.
    async fn set_infeed_blocked(&self, group: LocationGroupId, blocked: bool) -> Result<bool>;
}

/// Extension trait with the named queries used by the lifecycle coordinator.
#[async_trait]
pub trait OrderRepositoryExt: OrderRepository {
    /// Orders of a transport unit in any of `states`, oldest first.
    async fn find_in_states(
        &self,
        transport_unit: TransportUnitId,
        states: &[TransportOrderState],
    ) -> Result<Vec<TransportOrder>> {
        self.find(OrderQuery::in_states(transport_unit, states))
            .await
    }

    /// Orders of a transport unit eligible to start, best candidate first.
    async fn find_orders_to_start(
        &self,
        transport_unit: TransportUnitId,
    ) -> Result<Vec<TransportOrder>> {
        self.find(OrderQuery::orders_to_start(transport_unit)).await
    }

    /// Orders other than `excluding` that currently own the transport unit.
    async fn find_active(
        &self,
        transport_unit: TransportUnitId,
        excluding: TransportOrderId,
    ) -> Result<Vec<TransportOrder>> {
        self.find(
            OrderQuery::in_states(transport_unit, &TransportOrderState::ACTIVE).exclude(excluding),
        )
        .await
    }

    /// All orders of a transport unit, oldest first.
    async fn find_by_transport_unit(
        &self,
        transport_unit: TransportUnitId,
    ) -> Result<Vec<TransportOrder>> {
        self.find(OrderQuery::for_transport_unit(transport_unit))
            .await
    }
}

// Blanket implementation for all OrderRepository implementations
impl<T: OrderRepository + ?Sized> OrderRepositoryExt for T {}

#[async_trait]
impl<T: OrderRepository + ?Sized> OrderRepository for std::sync::Arc<T> {
    async fn insert(&self, order: TransportOrder) -> Result<()> {
        (**self).insert(order).await
    }

    async fn find_by_id(&self, id: TransportOrderId) -> Result<Option<TransportOrder>> {
        (**self).find_by_id(id).await
    }

    async fn find(&self, query: OrderQuery) -> Result<Vec<TransportOrder>> {
        (**self).find(query).await
    }

    async fn compare_and_set_state(
        &self,
        id: TransportOrderId,
        expected: TransportOrderState,
        new: TransportOrderState,
    ) -> Result<bool> {
        (**self).compare_and_set_state(id, expected, new).await
    }

    async fn start_exclusive(
        &self,
        id: TransportOrderId,
        expected: &[TransportOrderState],
    ) -> Result<ExclusiveStart> {
        (**self).start_exclusive(id, expected).await
    }

    async fn set_infeed_blocked(&self, group: LocationGroupId, blocked: bool) -> Result<bool> {
        (**self).set_infeed_blocked(group, blocked).await
    }
}
