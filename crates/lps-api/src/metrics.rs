//! Prometheus metrics for request traffic and engine outcomes.

use std::{sync::LazyLock, time::Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use lps_core::ItemType;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("uuid pattern is valid")
});
static NUMBER_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d+").expect("number pattern is valid"));

/// Initialize Prometheus metrics exporter
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let builder = PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("http_request_duration_seconds".to_string()),
        &[
            0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ],
    )?;

    let handle = builder.install_recorder()?;

    Ok(handle)
}

/// Middleware to record HTTP request metrics
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    // Route template when the request matched one, so set slugs and ids
    // do not blow up label cardinality
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| normalize_path(req.uri().path()));

    let in_flight = gauge!(
        "http_requests_in_flight",
        "method" => method.clone(),
        "path" => path.clone()
    );
    in_flight.increment(1.0);

    let response = next.run(req).await;

    in_flight.decrement(1.0);

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(duration);

    response
}

/// Replace UUIDs and numeric ids with placeholders
fn normalize_path(path: &str) -> String {
    let normalized = UUID_SEGMENT.replace_all(path, ":id");
    NUMBER_SEGMENT.replace_all(&normalized, "/:id").into_owned()
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}

/// Record the outcome of a checkin attempt (`success`, `already_done`, `too_early`)
pub fn record_checkin(outcome: &'static str) {
    counter!("checkins_total", "outcome" => outcome).increment(1);
}

/// Record a review selection (`item`, `completed`, `page`, `mastered`)
pub fn record_review_request(domain: ItemType, outcome: &'static str) {
    counter!(
        "review_requests_total",
        "domain" => domain.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record synthesized size buckets
pub fn record_buckets_created(count: usize) {
    counter!("group_buckets_created_total").increment(count as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/review/word/550e8400-e29b-41d4-a716-446655440000/mastered"),
            "/review/word/:id/mastered"
        );
        assert_eq!(normalize_path("/sets/123/groups"), "/sets/:id/groups");
        assert_eq!(
            normalize_path("/sets/550e8400-e29b-41d4-a716-446655440000/groups/456/reset"),
            "/sets/:id/groups/:id/reset"
        );
        assert_eq!(normalize_path("/health"), "/health");
    }
}
