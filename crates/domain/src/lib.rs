//! Domain layer for the transport order lifecycle system.
//!
//! This crate provides:
//! - the `TransportOrder` entity and its lifecycle state machine
//! - value objects for target location groups and priorities
//! - the error raised when a transition is not allowed

pub mod order;

pub use common::{LocationGroupId, TransportOrderId, TransportUnitId};
pub use order::{
    Priority, TargetLocationGroup, TransportOrder, TransportOrderError, TransportOrderState,
};
