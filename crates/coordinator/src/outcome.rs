//! Results of start decisions.

use common::TransportOrderId;
use domain::{TransportOrder, TransportOrderState};
use order_store::OrderStoreError;

/// What happened to a start attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The order is now `Started`.
    Started,

    /// The order's target location group has its infeed blocked.
    TargetBlocked,

    /// Another order owns the transport unit. `active` is unknown only when
    /// the conflict was caught by a storage constraint.
    UnitOccupied { active: Option<TransportOrderId> },

    /// The order is not (or no longer) in a startable state.
    NotStartable { state: TransportOrderState },
}

impl StartOutcome {
    /// Returns true if the order was started.
    pub fn is_started(&self) -> bool {
        matches!(self, StartOutcome::Started)
    }

    /// Short label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            StartOutcome::Started => "started",
            StartOutcome::TargetBlocked => "target_blocked",
            StartOutcome::UnitOccupied { .. } => "unit_occupied",
            StartOutcome::NotStartable { .. } => "not_startable",
        }
    }
}

impl std::fmt::Display for StartOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of looking for other active orders on a transport unit.
///
/// Keeps "nothing found" apart from "could not look".
#[derive(Debug)]
pub enum ConflictCheck {
    /// No other order owns the unit.
    Clear,

    /// These orders own the unit.
    Occupied(Vec<TransportOrderId>),

    /// The repository query failed.
    Failed(OrderStoreError),
}

impl ConflictCheck {
    /// Returns true if the unit is free.
    pub fn is_clear(&self) -> bool {
        matches!(self, ConflictCheck::Clear)
    }
}

impl From<order_store::Result<Vec<TransportOrder>>> for ConflictCheck {
    fn from(result: order_store::Result<Vec<TransportOrder>>) -> Self {
        match result {
            Ok(active) if active.is_empty() => ConflictCheck::Clear,
            Ok(active) => ConflictCheck::Occupied(active.iter().map(TransportOrder::id).collect()),
            Err(e) => ConflictCheck::Failed(e),
        }
    }
}
