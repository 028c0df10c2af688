//! Location group endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::LocationGroupId;
use serde::{Deserialize, Serialize};

use super::parse_uuid;
use super::transport_orders::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct InfeedRequest {
    pub blocked: bool,
}

#[derive(Serialize)]
pub struct InfeedResponse {
    pub id: String,
    pub infeed_blocked: bool,
}

/// PUT /location-groups/{id}/infeed: block or unblock the infeed.
///
/// Clearing the flag does not start waiting orders; they start on the next
/// lifecycle event of their transport unit.
#[tracing::instrument(skip(state, req), fields(blocked = req.blocked))]
pub async fn set_infeed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<InfeedRequest>,
) -> Result<Json<InfeedResponse>, ApiError> {
    let group = LocationGroupId::from_uuid(parse_uuid(&id)?);

    if !state.service.set_infeed_blocked(group, req.blocked).await? {
        return Err(ApiError::NotFound(format!("Location group {id} not found")));
    }

    Ok(Json(InfeedResponse {
        id: group.to_string(),
        infeed_blocked: req.blocked,
    }))
}
