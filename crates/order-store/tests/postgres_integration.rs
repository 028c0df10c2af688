//! PostgreSQL integration tests
//!
//! These tests share one PostgreSQL container. Every test works on its own
//! freshly generated transport units, so no table truncation is needed.
//! Run with:
//!
//! ```bash
//! cargo test -p order-store --test postgres_integration
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use domain::{Priority, TargetLocationGroup, TransportOrder, TransportOrderState};
use order_store::{
    ExclusiveStart, LocationGroupId, OrderQuery, OrderRepository, OrderRepositoryExt,
    OrderStoreError, PostgresOrderRepository, TransportOrderId, TransportUnitId,
};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_transport_orders_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a repository with its own pool
async fn get_test_repository() -> PostgresOrderRepository {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&info.connection_string)
        .await
        .unwrap();

    PostgresOrderRepository::new(pool)
}

fn order_in(unit: TransportUnitId, state: TransportOrderState) -> TransportOrder {
    TransportOrder::restore(
        TransportOrderId::new(),
        state,
        unit,
        None,
        Priority::Normal,
        Utc::now(),
    )
}

#[tokio::test]
async fn insert_and_find_by_id() {
    let repo = get_test_repository().await;
    let group = TargetLocationGroup::new("HIGH_BAY");
    let order = TransportOrder::new(TransportUnitId::new())
        .with_priority(Priority::High)
        .with_target_location_group(Some(group.clone()));

    repo.insert(order.clone()).await.unwrap();

    let stored = repo.find_by_id(order.id()).await.unwrap().unwrap();
    assert_eq!(stored.id(), order.id());
    assert_eq!(stored.state(), TransportOrderState::Created);
    assert_eq!(stored.transport_unit(), order.transport_unit());
    assert_eq!(stored.priority(), Priority::High);
    assert_eq!(stored.target_location_group(), Some(&group));
}

#[tokio::test]
async fn find_by_id_unknown_returns_none() {
    let repo = get_test_repository().await;
    assert!(
        repo.find_by_id(TransportOrderId::new())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn duplicate_insert_is_rejected() {
    let repo = get_test_repository().await;
    let order = TransportOrder::new(TransportUnitId::new());

    repo.insert(order.clone()).await.unwrap();
    let result = repo.insert(order).await;

    assert!(matches!(result, Err(OrderStoreError::DuplicateOrder(_))));
}

#[tokio::test]
async fn find_in_states_returns_oldest_first() {
    let repo = get_test_repository().await;
    let unit = TransportUnitId::new();
    let now = Utc::now();

    let newer = TransportOrder::new(unit).with_created_at(now);
    let older = TransportOrder::new(unit).with_created_at(now - Duration::seconds(30));
    let started = order_in(unit, TransportOrderState::Started);
    for order in [&newer, &older, &started] {
        repo.insert(order.clone()).await.unwrap();
    }

    let created = repo
        .find_in_states(unit, &[TransportOrderState::Created])
        .await
        .unwrap();
    let ids: Vec<_> = created.iter().map(TransportOrder::id).collect();
    assert_eq!(ids, vec![older.id(), newer.id()]);
}

#[tokio::test]
async fn orders_to_start_follows_start_priority() {
    let repo = get_test_repository().await;
    let unit = TransportUnitId::new();
    let now = Utc::now();

    let old_normal = order_in(unit, TransportOrderState::Initialized)
        .with_created_at(now - Duration::minutes(5));
    let new_highest = order_in(unit, TransportOrderState::Initialized)
        .with_priority(Priority::Highest)
        .with_created_at(now);
    let finished = order_in(unit, TransportOrderState::Finished);
    for order in [&old_normal, &new_highest, &finished] {
        repo.insert(order.clone()).await.unwrap();
    }

    let candidates = repo.find_orders_to_start(unit).await.unwrap();
    let ids: Vec<_> = candidates.iter().map(TransportOrder::id).collect();
    assert_eq!(ids, vec![new_highest.id(), old_normal.id()]);

    let first = repo
        .find(OrderQuery::orders_to_start(unit).limit(1))
        .await
        .unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].id(), new_highest.id());
}

#[tokio::test]
async fn compare_and_set_state_is_conditional() {
    let repo = get_test_repository().await;
    let order = TransportOrder::new(TransportUnitId::new());
    repo.insert(order.clone()).await.unwrap();

    assert!(
        repo.compare_and_set_state(
            order.id(),
            TransportOrderState::Created,
            TransportOrderState::Initialized
        )
        .await
        .unwrap()
    );
    assert!(
        !repo
            .compare_and_set_state(
                order.id(),
                TransportOrderState::Created,
                TransportOrderState::Initialized
            )
            .await
            .unwrap()
    );

    let missing = repo
        .compare_and_set_state(
            TransportOrderId::new(),
            TransportOrderState::Created,
            TransportOrderState::Initialized,
        )
        .await;
    assert!(matches!(missing, Err(OrderStoreError::OrderNotFound(_))));
}

#[tokio::test]
async fn start_exclusive_respects_active_order() {
    let repo = get_test_repository().await;
    let unit = TransportUnitId::new();
    let owner = order_in(unit, TransportOrderState::Started);
    let waiting = order_in(unit, TransportOrderState::Initialized);
    repo.insert(owner.clone()).await.unwrap();
    repo.insert(waiting.clone()).await.unwrap();

    let outcome = repo
        .start_exclusive(waiting.id(), &TransportOrderState::STARTABLE)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ExclusiveStart::Conflict {
            active: Some(owner.id())
        }
    );

    let stored = repo.find_by_id(waiting.id()).await.unwrap().unwrap();
    assert_eq!(stored.state(), TransportOrderState::Initialized);

    // Once the owner finishes, the waiting order may start.
    repo.compare_and_set_state(
        owner.id(),
        TransportOrderState::Started,
        TransportOrderState::Finished,
    )
    .await
    .unwrap();
    let outcome = repo
        .start_exclusive(waiting.id(), &TransportOrderState::STARTABLE)
        .await
        .unwrap();
    assert_eq!(outcome, ExclusiveStart::Started);
}

#[tokio::test]
async fn concurrent_start_exclusive_lets_exactly_one_win() {
    let repo = get_test_repository().await;
    let unit = TransportUnitId::new();
    let mut ids = Vec::new();
    for _ in 0..8 {
        let order = order_in(unit, TransportOrderState::Initialized);
        ids.push(order.id());
        repo.insert(order).await.unwrap();
    }

    let handles: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.start_exclusive(id, &TransportOrderState::STARTABLE)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut started = 0;
    for handle in handles {
        if handle.await.unwrap() == ExclusiveStart::Started {
            started += 1;
        }
    }
    assert_eq!(started, 1);

    let active = repo
        .find_in_states(unit, &TransportOrderState::ACTIVE)
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn unique_index_rejects_second_active_order() {
    let repo = get_test_repository().await;
    let unit = TransportUnitId::new();
    repo.insert(order_in(unit, TransportOrderState::Started))
        .await
        .unwrap();
    let waiting = order_in(unit, TransportOrderState::Initialized);
    repo.insert(waiting.clone()).await.unwrap();

    let applied = repo
        .compare_and_set_state(
            waiting.id(),
            TransportOrderState::Initialized,
            TransportOrderState::Started,
        )
        .await
        .unwrap();
    assert!(!applied);
}

#[tokio::test]
async fn insert_of_second_active_order_is_unit_occupied() {
    let repo = get_test_repository().await;
    let unit = TransportUnitId::new();
    repo.insert(order_in(unit, TransportOrderState::Started))
        .await
        .unwrap();

    let result = repo
        .insert(order_in(unit, TransportOrderState::Interrupted))
        .await;
    assert!(matches!(result, Err(OrderStoreError::UnitOccupied(u)) if u == unit));
}

#[tokio::test]
async fn unbounded_limit_returns_everything() {
    let repo = get_test_repository().await;
    let unit = TransportUnitId::new();
    for _ in 0..3 {
        repo.insert(TransportOrder::new(unit)).await.unwrap();
    }

    let found = repo
        .find(OrderQuery::for_transport_unit(unit).limit(usize::MAX))
        .await
        .unwrap();
    assert_eq!(found.len(), 3);
}

#[tokio::test]
async fn set_infeed_blocked_updates_joined_group() {
    let repo = get_test_repository().await;
    let group = TargetLocationGroup::new("STOCK");
    let order =
        TransportOrder::new(TransportUnitId::new()).with_target_location_group(Some(group.clone()));
    repo.insert(order.clone()).await.unwrap();

    assert!(repo.set_infeed_blocked(group.id, true).await.unwrap());
    let stored = repo.find_by_id(order.id()).await.unwrap().unwrap();
    assert!(stored.is_target_blocked());

    assert!(
        !repo
            .set_infeed_blocked(LocationGroupId::new(), true)
            .await
            .unwrap()
    );
}
