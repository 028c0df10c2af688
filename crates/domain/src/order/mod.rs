//! Transport order entity and related types.

mod state;
mod transport_order;
mod value_objects;

pub use state::TransportOrderState;
pub use transport_order::TransportOrder;
pub use value_objects::{Priority, TargetLocationGroup};

use thiserror::Error;

/// Errors that can occur when changing a transport order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportOrderError {
    /// The order is not in a state that allows the requested action.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: TransportOrderState,
        action: &'static str,
    },
}
