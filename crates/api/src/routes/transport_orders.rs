//! Transport order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{LocationGroupId, TransportOrderId, TransportUnitId};
use coordinator::{CreateTransportOrders, TransportOrderService};
use domain::{Priority, TargetLocationGroup, TransportOrder, TransportOrderState};
use order_store::OrderRepository;
use serde::{Deserialize, Serialize};

use super::parse_uuid;
use crate::error::ApiError;

/// Upper bound for orders created by one request.
const MAX_ORDERS_PER_REQUEST: usize = 100;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub service: TransportOrderService<Arc<dyn OrderRepository>>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateTransportOrdersRequest {
    pub transport_unit_id: String,
    pub target_location_group: Option<TargetLocationGroupRequest>,
    #[serde(default)]
    pub priority: Priority,
    pub count: Option<usize>,
}

#[derive(Deserialize)]
pub struct TargetLocationGroupRequest {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub infeed_blocked: bool,
}

// -- Response types --

#[derive(Serialize)]
pub struct TransportOrderResponse {
    pub id: String,
    pub state: TransportOrderState,
    pub transport_unit_id: String,
    pub target_location_group: Option<LocationGroupResponse>,
    pub priority: Priority,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct LocationGroupResponse {
    pub id: String,
    pub name: String,
    pub infeed_blocked: bool,
}

impl From<&TargetLocationGroup> for LocationGroupResponse {
    fn from(group: &TargetLocationGroup) -> Self {
        Self {
            id: group.id.to_string(),
            name: group.name.clone(),
            infeed_blocked: group.infeed_blocked,
        }
    }
}

impl From<TransportOrder> for TransportOrderResponse {
    fn from(order: TransportOrder) -> Self {
        Self {
            id: order.id().to_string(),
            state: order.state(),
            transport_unit_id: order.transport_unit().to_string(),
            target_location_group: order.target_location_group().map(Into::into),
            priority: order.priority(),
            created_at: order.created_at().to_rfc3339(),
        }
    }
}

// -- Handlers --

/// POST /transport-orders: create orders for a transport unit and run the
/// creation callback.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTransportOrdersRequest>,
) -> Result<(StatusCode, Json<Vec<TransportOrderResponse>>), ApiError> {
    let transport_unit = TransportUnitId::from_uuid(parse_uuid(&req.transport_unit_id)?);

    let count = req.count.unwrap_or(1);
    if count == 0 || count > MAX_ORDERS_PER_REQUEST {
        return Err(ApiError::BadRequest(format!(
            "count must be between 1 and {MAX_ORDERS_PER_REQUEST}"
        )));
    }

    let mut command = CreateTransportOrders::new(transport_unit)
        .with_priority(req.priority)
        .with_count(count);

    if let Some(group) = req.target_location_group {
        let id = match group.id {
            Some(id) => LocationGroupId::from_uuid(parse_uuid(&id)?),
            None => LocationGroupId::new(),
        };
        command = command.with_target_location_group(TargetLocationGroup {
            id,
            name: group.name,
            infeed_blocked: group.infeed_blocked,
        });
    }

    let orders = state.service.create_orders(command).await?;
    let response = orders.into_iter().map(Into::into).collect();

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /transport-orders/{id}: load a transport order by ID.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransportOrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .service
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Transport order {id} not found")))?;

    Ok(Json(order.into()))
}

/// GET /transport-units/{id}/transport-orders: list the orders of a unit,
/// oldest first.
#[tracing::instrument(skip(state))]
pub async fn list_for_unit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TransportOrderResponse>>, ApiError> {
    let transport_unit = TransportUnitId::from_uuid(parse_uuid(&id)?);
    let orders = state.service.orders_for_unit(transport_unit).await?;

    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// POST /transport-orders/{id}/finish
#[tracing::instrument(skip(state))]
pub async fn finish(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransportOrderResponse>, ApiError> {
    let order = state.service.finish(parse_order_id(&id)?).await?;
    Ok(Json(order.into()))
}

/// POST /transport-orders/{id}/cancel
#[tracing::instrument(skip(state))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransportOrderResponse>, ApiError> {
    let order = state.service.cancel(parse_order_id(&id)?).await?;
    Ok(Json(order.into()))
}

/// POST /transport-orders/{id}/fail
#[tracing::instrument(skip(state))]
pub async fn fail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransportOrderResponse>, ApiError> {
    let order = state.service.fail(parse_order_id(&id)?).await?;
    Ok(Json(order.into()))
}

/// POST /transport-orders/{id}/interrupt
#[tracing::instrument(skip(state))]
pub async fn interrupt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TransportOrderResponse>, ApiError> {
    let order = state.service.interrupt(parse_order_id(&id)?).await?;
    Ok(Json(order.into()))
}

fn parse_order_id(id: &str) -> Result<TransportOrderId, ApiError> {
    Ok(TransportOrderId::from_uuid(parse_uuid(id)?))
}
