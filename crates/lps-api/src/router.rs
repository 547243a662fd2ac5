use axum::{Router, http::StatusCode, middleware, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

use crate::{
    checkin,
    error::ApiError,
    groups,
    metrics::{metrics_handler, track_metrics},
    middleware::{cors::create_cors_layer, request_id::request_id_middleware},
    practice, review,
    state::ApiState,
    stats,
};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .merge(stats::routes())
        .merge(checkin::routes())
        .merge(practice::routes())
        .merge(review::routes())
        .merge(groups::routes())
        .fallback(handler_404)
}

/// The full service: routes, `/metrics` and the middleware stack.
pub fn app(state: ApiState, metrics: PrometheusHandle, allowed_origins: Vec<String>) -> Router {
    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics);

    router()
        .with_state(state)
        .merge(metrics_routes)
        .layer(middleware::from_fn(track_metrics))
        .layer(create_cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> ApiError {
    ApiError::NotFound("The requested resource was not found".to_string())
}
