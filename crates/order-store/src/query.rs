use domain::TransportOrderState;

use crate::{TransportOrderId, TransportUnitId};

/// Sort order applied to query results.
///
/// Ordering is part of the repository contract: callers that take the first
/// element of a result rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryOrdering {
    /// Oldest first: `created_at` ascending, then insertion order.
    #[default]
    CreationOrder,

    /// The order in which waiting orders are offered for starting:
    /// interrupted orders first, then priority descending, then oldest first.
    StartPriority,
}

/// Builder for transport order selection criteria.
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    /// Filter by transport unit.
    pub transport_unit: Option<TransportUnitId>,

    /// Filter by state (any of these states).
    pub states: Option<Vec<TransportOrderState>>,

    /// Leave this order out of the result.
    pub exclude: Option<TransportOrderId>,

    /// Sort order of the result.
    pub ordering: QueryOrdering,

    /// Maximum number of orders to return.
    pub limit: Option<usize>,
}

impl OrderQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for all orders of a transport unit.
    pub fn for_transport_unit(transport_unit: TransportUnitId) -> Self {
        Self {
            transport_unit: Some(transport_unit),
            ..Default::default()
        }
    }

    /// Orders of a transport unit that are in any of the given states,
    /// oldest first.
    pub fn in_states(transport_unit: TransportUnitId, states: &[TransportOrderState]) -> Self {
        Self::for_transport_unit(transport_unit).states(states.to_vec())
    }

    /// Orders of a transport unit that are eligible to start, best candidate
    /// first.
    pub fn orders_to_start(transport_unit: TransportUnitId) -> Self {
        Self::for_transport_unit(transport_unit)
            .states(TransportOrderState::STARTABLE.to_vec())
            .ordering(QueryOrdering::StartPriority)
    }

    /// Filters by state.
    pub fn states(mut self, states: Vec<TransportOrderState>) -> Self {
        self.states = Some(states);
        self
    }

    /// Excludes a single order from the result.
    pub fn exclude(mut self, id: TransportOrderId) -> Self {
        self.exclude = Some(id);
        self
    }

    /// Sets the result ordering.
    pub fn ordering(mut self, ordering: QueryOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Limits the number of orders returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if the given state passes the state filter.
    pub fn accepts_state(&self, state: TransportOrderState) -> bool {
        self.states
            .as_ref()
            .is_none_or(|states| states.contains(&state))
    }
}
