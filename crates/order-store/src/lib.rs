//! Storage for transport orders.
//!
//! The [`OrderRepository`] trait is the only way the lifecycle coordinator
//! reads or changes orders. Two backends are provided: an in-memory store for
//! tests and single-process use, and a PostgreSQL store.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::{LocationGroupId, TransportOrderId, TransportUnitId};
pub use error::{OrderStoreError, Result};
pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
pub use query::{OrderQuery, QueryOrdering};
pub use store::{ExclusiveStart, OrderRepository, OrderRepositoryExt};
