use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Priority, TargetLocationGroup, TransportOrder, TransportOrderState};
use sqlx::{
    PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};
use uuid::Uuid;

use crate::{
    LocationGroupId, OrderQuery, OrderStoreError, QueryOrdering, Result, TransportOrderId,
    TransportUnitId,
    store::{ExclusiveStart, OrderRepository},
};

const ACTIVE_ORDER_CONSTRAINT: &str = "unique_active_order_per_unit";
const PRIMARY_KEY_CONSTRAINT: &str = "transport_orders_pkey";

const SELECT_ORDERS: &str = r#"
    SELECT o.id, o.state, o.transport_unit_id, o.priority, o.created_at,
           g.id AS group_id, g.name AS group_name, g.infeed_blocked
    FROM transport_orders o
    LEFT JOIN location_groups g ON g.id = o.target_location_group_id
"#;

/// PostgreSQL-backed order repository.
///
/// `start_exclusive` serializes per transport unit with a transaction-scoped
/// advisory lock; the partial unique index `unique_active_order_per_unit`
/// backs it up.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` with a pool of at most `max_connections`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        tracing::info!(max_connections, "connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<TransportOrder> {
        let state: String = row.try_get("state")?;
        let state = TransportOrderState::parse(&state)
            .ok_or_else(|| OrderStoreError::InvalidData(format!("unknown state {state}")))?;
        let priority: i16 = row.try_get("priority")?;
        let priority = Priority::from_rank(priority)
            .ok_or_else(|| OrderStoreError::InvalidData(format!("unknown priority {priority}")))?;

        let group = match row.try_get::<Option<Uuid>, _>("group_id")? {
            Some(group_id) => Some(TargetLocationGroup {
                id: LocationGroupId::from_uuid(group_id),
                name: row.try_get("group_name")?,
                infeed_blocked: row.try_get("infeed_blocked")?,
            }),
            None => None,
        };

        Ok(TransportOrder::restore(
            TransportOrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            state,
            TransportUnitId::from_uuid(row.try_get::<Uuid, _>("transport_unit_id")?),
            group,
            priority,
            row.try_get::<DateTime<Utc>, _>("created_at")?,
        ))
    }

    fn state_names(states: &[TransportOrderState]) -> Vec<String> {
        states.iter().map(|s| s.as_str().to_string()).collect()
    }

    fn violates(error: &sqlx::Error, constraint: &str) -> bool {
        matches!(error, sqlx::Error::Database(db_err) if db_err.constraint() == Some(constraint))
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn insert(&self, order: TransportOrder) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        if let Some(group) = order.target_location_group() {
            sqlx::query(
                r#"
                INSERT INTO location_groups (id, name, infeed_blocked)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(group.id.as_uuid())
            .bind(&group.name)
            .bind(group.infeed_blocked)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO transport_orders (id, state, transport_unit_id, target_location_group_id, priority, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.state().as_str())
        .bind(order.transport_unit().as_uuid())
        .bind(order.target_location_group().map(|g| g.id.as_uuid()))
        .bind(order.priority().rank())
        .bind(order.created_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if Self::violates(&e, PRIMARY_KEY_CONSTRAINT) {
                return OrderStoreError::DuplicateOrder(order.id());
            }
            if Self::violates(&e, ACTIVE_ORDER_CONSTRAINT) {
                return OrderStoreError::UnitOccupied(order.transport_unit());
            }
            OrderStoreError::Database(e)
        })?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: TransportOrderId) -> Result<Option<TransportOrder>> {
        let sql = format!("{SELECT_ORDERS} WHERE o.id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn find(&self, query: OrderQuery) -> Result<Vec<TransportOrder>> {
        let mut sql = format!("{SELECT_ORDERS} WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.transport_unit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND o.transport_unit_id = ${param_count}"));
        }
        if query.states.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND o.state = ANY(${param_count})"));
        }
        if query.exclude.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND o.id <> ${param_count}"));
        }

        match query.ordering {
            QueryOrdering::CreationOrder => {
                sql.push_str(" ORDER BY o.created_at ASC, o.sequence ASC");
            }
            QueryOrdering::StartPriority => {
                sql.push_str(
                    " ORDER BY (o.state = 'INTERRUPTED') DESC, o.priority DESC, o.created_at ASC, o.sequence ASC",
                );
            }
        }

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }

        // Build and execute query with parameters
        let mut sqlx_query = sqlx::query(&sql);

        if let Some(unit) = query.transport_unit {
            sqlx_query = sqlx_query.bind(unit.as_uuid());
        }
        if let Some(states) = &query.states {
            sqlx_query = sqlx_query.bind(Self::state_names(states));
        }
        if let Some(excluded) = query.exclude {
            sqlx_query = sqlx_query.bind(excluded.as_uuid());
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn compare_and_set_state(
        &self,
        id: TransportOrderId,
        expected: TransportOrderState,
        new: TransportOrderState,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE transport_orders SET state = $1 WHERE id = $2 AND state = $3")
            .bind(new.as_str())
            .bind(id.as_uuid())
            .bind(expected.as_str())
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 1 => Ok(true),
            Ok(_) => {
                let exists: Option<Uuid> =
                    sqlx::query_scalar("SELECT id FROM transport_orders WHERE id = $1")
                        .bind(id.as_uuid())
                        .fetch_optional(&self.pool)
                        .await?;
                match exists {
                    Some(_) => Ok(false),
                    None => Err(OrderStoreError::OrderNotFound(id)),
                }
            }
            Err(e) if Self::violates(&e, ACTIVE_ORDER_CONSTRAINT) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn start_exclusive(
        &self,
        id: TransportOrderId,
        expected: &[TransportOrderState],
    ) -> Result<ExclusiveStart> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT transport_unit_id, state FROM transport_orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(OrderStoreError::OrderNotFound(id))?;

        let unit: Uuid = row.try_get("transport_unit_id")?;
        let state: String = row.try_get("state")?;
        let actual = TransportOrderState::parse(&state)
            .ok_or_else(|| OrderStoreError::InvalidData(format!("unknown state {state}")))?;
        if !expected.contains(&actual) {
            return Ok(ExclusiveStart::StateChanged { actual });
        }

        // Held until commit or rollback; serializes starts on this unit.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(unit.to_string())
            .execute(&mut *tx)
            .await?;

        let active: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM transport_orders
            WHERE transport_unit_id = $1 AND id <> $2 AND state = ANY($3)
            ORDER BY sequence ASC
            LIMIT 1
            "#,
        )
        .bind(unit)
        .bind(id.as_uuid())
        .bind(Self::state_names(&TransportOrderState::ACTIVE))
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(active) = active {
            metrics::counter!("order_store_start_conflicts_total").increment(1);
            return Ok(ExclusiveStart::Conflict {
                active: Some(TransportOrderId::from_uuid(active)),
            });
        }

        let updated = sqlx::query("UPDATE transport_orders SET state = $1 WHERE id = $2")
            .bind(TransportOrderState::Started.as_str())
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await;

        match updated {
            Ok(_) => {
                tx.commit().await?;
                Ok(ExclusiveStart::Started)
            }
            Err(e) if Self::violates(&e, ACTIVE_ORDER_CONSTRAINT) => {
                tracing::warn!(order_id = %id, "active order constraint rejected start");
                metrics::counter!("order_store_start_conflicts_total").increment(1);
                Ok(ExclusiveStart::Conflict { active: None })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn set_infeed_blocked(&self, group: LocationGroupId, blocked: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE location_groups SET infeed_blocked = $1 WHERE id = $2")
            .bind(blocked)
            .bind(group.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
