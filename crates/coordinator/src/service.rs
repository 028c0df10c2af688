//! Application service for transport order commands.

use std::sync::Arc;

use common::{LocationGroupId, TransportOrderId, TransportUnitId};
use domain::{Priority, TargetLocationGroup, TransportOrder, TransportOrderError};
use order_store::{OrderRepository, OrderRepositoryExt};

use crate::coordinator::LifecycleCoordinator;
use crate::delegate::TransportOrderStateDelegate;
use crate::error::{CoordinatorError, Result};

/// Command to create one or more orders for a transport unit.
#[derive(Debug, Clone)]
pub struct CreateTransportOrders {
    pub transport_unit: TransportUnitId,
    pub target_location_group: Option<TargetLocationGroup>,
    pub priority: Priority,
    pub count: usize,
}

impl CreateTransportOrders {
    /// Creates a command for a single order with normal priority.
    pub fn new(transport_unit: TransportUnitId) -> Self {
        Self {
            transport_unit,
            target_location_group: None,
            priority: Priority::default(),
            count: 1,
        }
    }

    pub fn with_target_location_group(mut self, group: TargetLocationGroup) -> Self {
        self.target_location_group = Some(group);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

/// Applies state changes reported from outside and notifies the delegate.
///
/// Every command loads the order, applies the transition on the entity,
/// writes it back with a compare-and-set and then hands the matching
/// lifecycle event to the delegate.
pub struct TransportOrderService<R: OrderRepository> {
    repository: R,
    delegate: Arc<dyn TransportOrderStateDelegate>,
}

impl<R: OrderRepository> TransportOrderService<R> {
    /// Creates a service with a custom delegate.
    pub fn new(repository: R, delegate: Arc<dyn TransportOrderStateDelegate>) -> Self {
        Self {
            repository,
            delegate,
        }
    }

    /// Creates the orders of `command` and runs the creation callback once.
    ///
    /// Returns the orders as stored after the callback. If an insert fails
    /// part way, the callback still runs for the orders already stored so
    /// they do not stay `Created`, and the insert error is returned.
    #[tracing::instrument(skip(self, command), fields(transport_unit = %command.transport_unit, count = command.count))]
    pub async fn create_orders(
        &self,
        command: CreateTransportOrders,
    ) -> Result<Vec<TransportOrder>> {
        let mut ids = Vec::with_capacity(command.count);
        for _ in 0..command.count {
            let order = TransportOrder::new(command.transport_unit)
                .with_target_location_group(command.target_location_group.clone())
                .with_priority(command.priority);
            let id = order.id();
            if let Err(e) = self.repository.insert(order).await {
                if !ids.is_empty() {
                    self.after_partial_creation(command.transport_unit, ids.len())
                        .await;
                }
                return Err(e.into());
            }
            ids.push(id);
        }
        metrics::counter!("transport_orders_created_total").increment(ids.len() as u64);

        self.delegate.after_creation(command.transport_unit).await?;

        let mut orders = Vec::with_capacity(ids.len());
        for id in ids {
            orders.push(self.load(id).await?);
        }
        Ok(orders)
    }

    async fn after_partial_creation(&self, transport_unit: TransportUnitId, stored: usize) {
        metrics::counter!("transport_orders_created_total").increment(stored as u64);
        tracing::warn!(%transport_unit, stored, "creating transport orders failed part way");
        if let Err(e) = self.delegate.after_creation(transport_unit).await {
            tracing::warn!(%transport_unit, error = %e, "creation callback failed for stored orders");
        }
    }

    /// Loads an order by ID.
    pub async fn get_order(&self, id: TransportOrderId) -> Result<Option<TransportOrder>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Lists all orders of a transport unit, oldest first.
    pub async fn orders_for_unit(
        &self,
        transport_unit: TransportUnitId,
    ) -> Result<Vec<TransportOrder>> {
        Ok(self
            .repository
            .find_by_transport_unit(transport_unit)
            .await?)
    }

    /// Marks a started order as finished.
    #[tracing::instrument(skip(self))]
    pub async fn finish(&self, id: TransportOrderId) -> Result<TransportOrder> {
        self.change_state(id, TransportOrder::finish).await?;
        self.delegate.after_finish(id).await?;
        self.load(id).await
    }

    /// Cancels an order that has not reached a final state.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, id: TransportOrderId) -> Result<TransportOrder> {
        self.change_state(id, TransportOrder::cancel).await?;
        self.delegate.on_cancel(id).await?;
        self.load(id).await
    }

    /// Marks an order as failed.
    #[tracing::instrument(skip(self))]
    pub async fn fail(&self, id: TransportOrderId) -> Result<TransportOrder> {
        self.change_state(id, TransportOrder::fail).await?;
        self.delegate.on_failure(id).await?;
        self.load(id).await
    }

    /// Interrupts a started order.
    #[tracing::instrument(skip(self))]
    pub async fn interrupt(&self, id: TransportOrderId) -> Result<TransportOrder> {
        self.change_state(id, TransportOrder::interrupt).await?;
        self.delegate.on_interrupt(id).await?;
        self.load(id).await
    }

    /// Blocks or unblocks the infeed of a location group.
    ///
    /// Returns false if the group is unknown. Unblocking does not start
    /// waiting orders by itself.
    #[tracing::instrument(skip(self))]
    pub async fn set_infeed_blocked(&self, group: LocationGroupId, blocked: bool) -> Result<bool> {
        Ok(self.repository.set_infeed_blocked(group, blocked).await?)
    }

    async fn load(&self, id: TransportOrderId) -> Result<TransportOrder> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(CoordinatorError::OrderNotFound(id))
    }

    async fn change_state(
        &self,
        id: TransportOrderId,
        transition: fn(&mut TransportOrder) -> std::result::Result<(), TransportOrderError>,
    ) -> Result<()> {
        let mut order = self.load(id).await?;
        let previous = order.state();
        transition(&mut order)?;

        let applied = self
            .repository
            .compare_and_set_state(id, previous, order.state())
            .await?;
        if !applied {
            return Err(CoordinatorError::ConcurrentModification(id));
        }

        tracing::info!(order_id = %id, from = %previous, to = %order.state(), "transport order state changed");
        Ok(())
    }
}

impl<R: OrderRepository + Clone + 'static> TransportOrderService<R> {
    /// Creates a service driven by the default [`LifecycleCoordinator`].
    pub fn with_coordinator(repository: R) -> Self {
        let delegate = Arc::new(LifecycleCoordinator::new(repository.clone()));
        Self::new(repository, delegate)
    }
}
