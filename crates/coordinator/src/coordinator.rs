//! Default start policy for transport orders.

use async_trait::async_trait;
use common::{TransportOrderId, TransportUnitId};
use domain::{TransportOrder, TransportOrderState};
use order_store::{ExclusiveStart, OrderRepository, OrderRepositoryExt};

use crate::delegate::TransportOrderStateDelegate;
use crate::error::Result;
use crate::outcome::{ConflictCheck, StartOutcome};

/// Decides which order of a transport unit starts next.
///
/// An order is started only if its target location group accepts infeed and
/// no other order of the same transport unit is `Started` or `Interrupted`.
/// The final check-and-set goes through
/// [`OrderRepository::start_exclusive`], so concurrent events for the same
/// unit can never start two orders.
///
/// Guard refusals are not errors: the order stays as it was and is picked up
/// again by a later lifecycle event of the unit.
pub struct LifecycleCoordinator<R: OrderRepository> {
    repository: R,
}

impl<R: OrderRepository> LifecycleCoordinator<R> {
    /// Creates a new coordinator on top of the given repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Finds the best order to start on the transport unit of `order_id`.
    ///
    /// Returns `None` if the order is unknown or the unit has nothing to
    /// start. `Interrupted` orders come first, then higher priority, then
    /// older orders.
    #[tracing::instrument(skip(self))]
    pub async fn find_order_to_start(
        &self,
        order_id: TransportOrderId,
    ) -> Result<Option<TransportOrder>> {
        let Some(order) = self.repository.find_by_id(order_id).await? else {
            tracing::warn!(%order_id, "transport order not found");
            return Ok(None);
        };

        let transport_unit = order.transport_unit();
        tracing::debug!(%transport_unit, "searching for an order to start");

        let candidate = self
            .repository
            .find_orders_to_start(transport_unit)
            .await?
            .into_iter()
            .next();

        if candidate.is_none() {
            tracing::debug!(%transport_unit, "no order found that could be started");
        }
        Ok(candidate)
    }

    /// Moves a `Created` order to `Initialized`.
    ///
    /// Returns false if the order was no longer `Created` in the repository.
    async fn initialize(&self, order: &mut TransportOrder) -> Result<bool> {
        order.initialize()?;

        let applied = self
            .repository
            .compare_and_set_state(
                order.id(),
                TransportOrderState::Created,
                TransportOrderState::Initialized,
            )
            .await?;

        if applied {
            metrics::counter!("transport_orders_initialized_total").increment(1);
            tracing::debug!(order_id = %order.id(), "transport order initialized");
        } else {
            tracing::debug!(order_id = %order.id(), "transport order changed concurrently, not initialized");
        }
        Ok(applied)
    }

    /// Tries to start `order`.
    ///
    /// The target location group is checked as loaded with `order`. On any
    /// outcome other than [`StartOutcome::Started`] the stored order is left
    /// untouched.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id(), transport_unit = %order.transport_unit()))]
    pub async fn start(&self, order: &TransportOrder) -> Result<StartOutcome> {
        let outcome = self.try_start(order).await?;

        if outcome.is_started() {
            metrics::counter!("transport_orders_started_total").increment(1);
            tracing::info!(priority = ?order.priority(), "transport order started");
        } else {
            metrics::counter!("transport_order_start_refused_total", "reason" => outcome.as_str())
                .increment(1);
            tracing::debug!(%outcome, "transport order not started");
        }
        Ok(outcome)
    }

    async fn try_start(&self, order: &TransportOrder) -> Result<StartOutcome> {
        if !order.state().can_start() {
            return Ok(StartOutcome::NotStartable {
                state: order.state(),
            });
        }

        if order.is_target_blocked() {
            tracing::debug!("target location group is blocked for infeed");
            return Ok(StartOutcome::TargetBlocked);
        }

        let check = ConflictCheck::from(
            self.repository
                .find_active(order.transport_unit(), order.id())
                .await,
        );
        match check {
            ConflictCheck::Clear => {
                tracing::debug!("no active transport order on the transport unit");
            }
            ConflictCheck::Occupied(active) => {
                tracing::debug!(?active, "transport unit already has an active order");
                return Ok(StartOutcome::UnitOccupied {
                    active: active.first().copied(),
                });
            }
            ConflictCheck::Failed(e) => return Err(e.into()),
        }

        let outcome = match self
            .repository
            .start_exclusive(order.id(), &TransportOrderState::STARTABLE)
            .await?
        {
            ExclusiveStart::Started => StartOutcome::Started,
            ExclusiveStart::Conflict { active } => StartOutcome::UnitOccupied { active },
            ExclusiveStart::StateChanged { actual } => StartOutcome::NotStartable { state: actual },
        };
        Ok(outcome)
    }

    /// Starts the best candidate of the unit owning `order_id`, if any.
    async fn start_next(&self, order_id: TransportOrderId) -> Result<Option<StartOutcome>> {
        match self.find_order_to_start(order_id).await? {
            Some(candidate) => Ok(Some(self.start(&candidate).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<R: OrderRepository> TransportOrderStateDelegate for LifecycleCoordinator<R> {
    #[tracing::instrument(skip(self))]
    async fn after_creation(&self, transport_unit: TransportUnitId) -> Result<()> {
        let created = self
            .repository
            .find_in_states(transport_unit, &[TransportOrderState::Created])
            .await?;
        tracing::debug!(count = created.len(), "initializing created transport orders");

        for mut order in created {
            if self.initialize(&mut order).await? {
                self.start(&order).await?;
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn after_finish(&self, order_id: TransportOrderId) -> Result<()> {
        self.start_next(order_id).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn on_cancel(&self, order_id: TransportOrderId) -> Result<()> {
        if self.start_next(order_id).await?.is_none() {
            tracing::warn!(%order_id, "no transport order to start after cancellation");
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn on_failure(&self, order_id: TransportOrderId) -> Result<()> {
        self.start_next(order_id).await?;
        Ok(())
    }

    async fn on_interrupt(&self, order_id: TransportOrderId) -> Result<()> {
        // The interrupted order keeps the unit; nothing else may start.
        tracing::debug!(%order_id, "transport order interrupted");
        Ok(())
    }
}
