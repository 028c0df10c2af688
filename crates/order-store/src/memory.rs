use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use domain::{TargetLocationGroup, TransportOrder, TransportOrderState};
use tokio::sync::RwLock;

use crate::{
    LocationGroupId, OrderQuery, OrderStoreError, QueryOrdering, Result, TransportOrderId,
    store::{ExclusiveStart, OrderRepository},
};

#[derive(Debug, Clone)]
struct StoredOrder {
    /// Insertion sequence, the final tie-breaker of every ordering.
    sequence: u64,
    order: TransportOrder,
    group_id: Option<LocationGroupId>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    orders: HashMap<TransportOrderId, StoredOrder>,
    groups: HashMap<LocationGroupId, TargetLocationGroup>,
    next_sequence: u64,
}

impl InMemoryState {
    /// Returns the order with its location group as currently stored.
    fn hydrate(&self, stored: &StoredOrder) -> TransportOrder {
        let group = stored.group_id.and_then(|id| self.groups.get(&id).cloned());
        stored.order.clone().with_target_location_group(group)
    }

    /// Returns the order other than `order` that owns its transport unit.
    fn active_owner(&self, order: &TransportOrder) -> Option<TransportOrderId> {
        let unit = order.transport_unit();
        self.orders
            .values()
            .filter(|other| other.order.id() != order.id())
            .filter(|other| other.order.transport_unit() == unit && other.order.is_active())
            .min_by_key(|other| other.sequence)
            .map(|other| other.order.id())
    }
}

/// In-memory order repository.
///
/// Every conditional update runs under a single write lock, which makes the
/// check-and-set of `start_exclusive` atomic across all transport units.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    state: Arc<RwLock<InMemoryState>>,
    fail_on_query: Arc<AtomicBool>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the repository to fail every read and write.
    pub fn set_fail_on_query(&self, fail: bool) {
        self.fail_on_query.store(fail, Ordering::SeqCst);
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    fn check_available(&self) -> Result<()> {
        if self.fail_on_query.load(Ordering::SeqCst) {
            return Err(OrderStoreError::Unavailable(
                "in-memory repository configured to fail".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: TransportOrder) -> Result<()> {
        self.check_available()?;
        let mut state = self.state.write().await;

        if state.orders.contains_key(&order.id()) {
            return Err(OrderStoreError::DuplicateOrder(order.id()));
        }
        if order.is_active() && state.active_owner(&order).is_some() {
            return Err(OrderStoreError::UnitOccupied(order.transport_unit()));
        }

        let group_id = order.target_location_group().map(|group| {
            state
                .groups
                .entry(group.id)
                .or_insert_with(|| group.clone());
            group.id
        });

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.orders.insert(
            order.id(),
            StoredOrder {
                sequence,
                order,
                group_id,
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: TransportOrderId) -> Result<Option<TransportOrder>> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.orders.get(&id).map(|stored| state.hydrate(stored)))
    }

    async fn find(&self, query: OrderQuery) -> Result<Vec<TransportOrder>> {
        self.check_available()?;
        let state = self.state.read().await;

        let mut matches: Vec<&StoredOrder> = state
            .orders
            .values()
            .filter(|stored| {
                if let Some(unit) = query.transport_unit
                    && stored.order.transport_unit() != unit
                {
                    return false;
                }
                if let Some(excluded) = query.exclude
                    && stored.order.id() == excluded
                {
                    return false;
                }
                query.accepts_state(stored.order.state())
            })
            .collect();

        match query.ordering {
            QueryOrdering::CreationOrder => {
                matches.sort_by_key(|stored| (stored.order.created_at(), stored.sequence));
            }
            QueryOrdering::StartPriority => {
                matches.sort_by_key(|stored| {
                    (
                        stored.order.state() != TransportOrderState::Interrupted,
                        Reverse(stored.order.priority()),
                        stored.order.created_at(),
                        stored.sequence,
                    )
                });
            }
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(matches
            .into_iter()
            .take(limit)
            .map(|stored| state.hydrate(stored))
            .collect())
    }

    async fn compare_and_set_state(
        &self,
        id: TransportOrderId,
        expected: TransportOrderState,
        new: TransportOrderState,
    ) -> Result<bool> {
        self.check_available()?;
        let mut state = self.state.write().await;

        let stored = state
            .orders
            .get(&id)
            .ok_or(OrderStoreError::OrderNotFound(id))?;
        if stored.order.state() != expected {
            return Ok(false);
        }
        // Mirrors the unique index of the PostgreSQL schema.
        if new.is_active() && state.active_owner(&stored.order).is_some() {
            return Ok(false);
        }

        let stored = state
            .orders
            .get_mut(&id)
            .ok_or(OrderStoreError::OrderNotFound(id))?;
        stored.order = TransportOrder::restore(
            stored.order.id(),
            new,
            stored.order.transport_unit(),
            stored.order.target_location_group().cloned(),
            stored.order.priority(),
            stored.order.created_at(),
        );
        Ok(true)
    }

    async fn start_exclusive(
        &self,
        id: TransportOrderId,
        expected: &[TransportOrderState],
    ) -> Result<ExclusiveStart> {
        self.check_available()?;
        let mut state = self.state.write().await;

        let stored = state
            .orders
            .get(&id)
            .ok_or(OrderStoreError::OrderNotFound(id))?;
        let actual = stored.order.state();
        if !expected.contains(&actual) {
            return Ok(ExclusiveStart::StateChanged { actual });
        }
        if let Some(active) = state.active_owner(&stored.order) {
            metrics::counter!("order_store_start_conflicts_total").increment(1);
            return Ok(ExclusiveStart::Conflict {
                active: Some(active),
            });
        }

        let stored = state
            .orders
            .get_mut(&id)
            .ok_or(OrderStoreError::OrderNotFound(id))?;
        stored
            .order
            .start()
            .map_err(|e| OrderStoreError::InvalidData(e.to_string()))?;
        Ok(ExclusiveStart::Started)
    }

    async fn set_infeed_blocked(&self, group: LocationGroupId, blocked: bool) -> Result<bool> {
        self.check_available()?;
        let mut state = self.state.write().await;
        match state.groups.get_mut(&group) {
            Some(stored) => {
                stored.infeed_blocked = blocked;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
