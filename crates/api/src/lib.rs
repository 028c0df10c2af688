//! HTTP API server with observability for the transport order lifecycle
//! coordinator.
//!
//! Provides REST endpoints that report external state changes of transport
//! orders, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use coordinator::TransportOrderService;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::transport_orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/transport-orders", post(routes::transport_orders::create))
        .route("/transport-orders/{id}", get(routes::transport_orders::get))
        .route(
            "/transport-orders/{id}/finish",
            post(routes::transport_orders::finish),
        )
        .route(
            "/transport-orders/{id}/cancel",
            post(routes::transport_orders::cancel),
        )
        .route(
            "/transport-orders/{id}/fail",
            post(routes::transport_orders::fail),
        )
        .route(
            "/transport-orders/{id}/interrupt",
            post(routes::transport_orders::interrupt),
        )
        .route(
            "/transport-units/{id}/transport-orders",
            get(routes::transport_orders::list_for_unit),
        )
        .route(
            "/location-groups/{id}/infeed",
            put(routes::location_groups::set_infeed),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with the default lifecycle coordinator.
pub fn create_default_state(repository: Arc<dyn OrderRepository>) -> Arc<AppState> {
    Arc::new(AppState {
        service: TransportOrderService::with_coordinator(repository),
    })
}
