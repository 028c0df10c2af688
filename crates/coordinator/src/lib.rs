//! Transport order lifecycle coordination.
//!
//! Lifecycle events (creation, finish, cancel, failure, interrupt) are
//! delivered to a [`TransportOrderStateDelegate`]. The default delegate,
//! [`LifecycleCoordinator`], decides which waiting order of a transport unit
//! may start, making sure that at most one order per unit is started or
//! interrupted at any time.
//!
//! On every event the coordinator:
//! 1. Resolves the order or transport unit the event refers to
//! 2. Asks the repository for candidate orders
//! 3. Runs the start guard (target infeed, unit exclusivity) on the candidate

pub mod coordinator;
pub mod delegate;
pub mod error;
pub mod event;
pub mod outcome;
pub mod service;

pub use coordinator::LifecycleCoordinator;
pub use delegate::TransportOrderStateDelegate;
pub use error::CoordinatorError;
pub use event::{LifecycleEvent, dispatch};
pub use outcome::{ConflictCheck, StartOutcome};
pub use service::{CreateTransportOrders, TransportOrderService};
