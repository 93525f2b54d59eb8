//! Prometheus metrics handler
//!
//! Exposes `GET /metrics` in Prometheus text format, read from the
//! process-wide `metrics-exporter-prometheus` recorder.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Shared state for the metrics endpoint
#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// Register help text for the booking counters.
pub fn describe_metrics() {
    metrics::describe_counter!("bookings_created_total", "Bookings committed");
    metrics::describe_counter!(
        "booking_conflicts_total",
        "Booking requests rejected because a night was taken"
    );
    metrics::describe_counter!("room_check_ins_total", "Stays checked in");
    metrics::describe_counter!(
        "room_check_outs_total",
        "Stays checked out or reservations released"
    );
    metrics::describe_counter!("http_requests_total", "HTTP requests by route and status");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        metrics::Unit::Seconds,
        "HTTP request latency"
    );
}

/// `GET /metrics`: Prometheus scrape endpoint (no auth)
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        state.handle.render(),
    )
}
