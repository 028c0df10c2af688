//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coordinator::CoordinatorError;
use order_store::OrderStoreError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),
    /// Coordinator or service error.
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Coordinator(err) => coordinator_error_status(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(error = %message, "internal server error");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn coordinator_error_status(err: &CoordinatorError) -> StatusCode {
    match err {
        CoordinatorError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        CoordinatorError::TransportOrder(_) | CoordinatorError::ConcurrentModification(_) => {
            StatusCode::CONFLICT
        }
        CoordinatorError::OrderStore(store_err) => match store_err {
            OrderStoreError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            OrderStoreError::DuplicateOrder(_) | OrderStoreError::UnitOccupied(_) => {
                StatusCode::CONFLICT
            }
            OrderStoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

impl From<OrderStoreError> for ApiError {
    fn from(err: OrderStoreError) -> Self {
        ApiError::Coordinator(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{TransportOrderId, TransportUnitId};
    use domain::{TransportOrderError, TransportOrderState};

    #[test]
    fn test_status_mapping() {
        let id = TransportOrderId::new();
        assert_eq!(
            ApiError::from(CoordinatorError::OrderNotFound(id)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CoordinatorError::TransportOrder(
                TransportOrderError::InvalidStateTransition {
                    current_state: TransportOrderState::Finished,
                    action: "cancel",
                }
            ))
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(OrderStoreError::Unavailable("down".to_string())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(OrderStoreError::UnitOccupied(TransportUnitId::new())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(OrderStoreError::InvalidData("bad".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::BadRequest("nope".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
