//! Transport order entity.

use chrono::{DateTime, Utc};
use common::{TransportOrderId, TransportUnitId};
use serde::{Deserialize, Serialize};

use super::{Priority, TargetLocationGroup, TransportOrderError, TransportOrderState};

/// A unit of work that moves one transport unit to a target.
///
/// Many orders may reference the same transport unit over time, but at most
/// one of them may own it (be `Started` or `Interrupted`) at any instant.
/// Transition methods only validate and change `state`; persisting the change
/// is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportOrder {
    id: TransportOrderId,
    state: TransportOrderState,
    transport_unit: TransportUnitId,
    target_location_group: Option<TargetLocationGroup>,
    priority: Priority,
    created_at: DateTime<Utc>,
}

impl TransportOrder {
    /// Creates a new order in `Created` state for the given transport unit.
    pub fn new(transport_unit: TransportUnitId) -> Self {
        Self {
            id: TransportOrderId::new(),
            state: TransportOrderState::Created,
            transport_unit,
            target_location_group: None,
            priority: Priority::default(),
            created_at: Utc::now(),
        }
    }

    /// Rebuilds an order from stored values.
    pub fn restore(
        id: TransportOrderId,
        state: TransportOrderState,
        transport_unit: TransportUnitId,
        target_location_group: Option<TargetLocationGroup>,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            state,
            transport_unit,
            target_location_group,
            priority,
            created_at,
        }
    }

    /// Sets the target location group.
    pub fn with_target_location_group(mut self, group: Option<TargetLocationGroup>) -> Self {
        self.target_location_group = group;
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Overrides the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

// Query methods
impl TransportOrder {
    pub fn id(&self) -> TransportOrderId {
        self.id
    }

    pub fn state(&self) -> TransportOrderState {
        self.state
    }

    pub fn transport_unit(&self) -> TransportUnitId {
        self.transport_unit
    }

    pub fn target_location_group(&self) -> Option<&TargetLocationGroup> {
        self.target_location_group.as_ref()
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns true if the order targets a group whose infeed is blocked.
    pub fn is_target_blocked(&self) -> bool {
        self.target_location_group
            .as_ref()
            .is_some_and(TargetLocationGroup::is_infeed_blocked)
    }

    /// Returns true if the order currently owns its transport unit.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

// Transitions
impl TransportOrder {
    /// Created → Initialized.
    pub fn initialize(&mut self) -> Result<(), TransportOrderError> {
        self.transition(
            self.state.can_initialize(),
            TransportOrderState::Initialized,
            "initialize",
        )
    }

    /// Initialized/Interrupted → Started. Exclusivity on the transport unit
    /// is not checked here.
    pub fn start(&mut self) -> Result<(), TransportOrderError> {
        self.transition(
            self.state.can_start(),
            TransportOrderState::Started,
            "start",
        )
    }

    /// Started → Finished.
    pub fn finish(&mut self) -> Result<(), TransportOrderError> {
        self.transition(
            self.state.can_finish(),
            TransportOrderState::Finished,
            "finish",
        )
    }

    /// Started → Interrupted.
    pub fn interrupt(&mut self) -> Result<(), TransportOrderError> {
        self.transition(
            self.state.can_interrupt(),
            TransportOrderState::Interrupted,
            "interrupt",
        )
    }

    /// Any non-terminal state → Canceled.
    pub fn cancel(&mut self) -> Result<(), TransportOrderError> {
        self.transition(
            self.state.can_cancel(),
            TransportOrderState::Canceled,
            "cancel",
        )
    }

    /// Initialized/Started/Interrupted → Failed.
    pub fn fail(&mut self) -> Result<(), TransportOrderError> {
        self.transition(self.state.can_fail(), TransportOrderState::Failed, "fail")
    }

    fn transition(
        &mut self,
        allowed: bool,
        next: TransportOrderState,
        action: &'static str,
    ) -> Result<(), TransportOrderError> {
        if !allowed {
            return Err(TransportOrderError::InvalidStateTransition {
                current_state: self.state,
                action,
            });
        }
        self.state = next;
        Ok(())
    }
}
