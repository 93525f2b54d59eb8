//! HTTP request metrics middleware
//!
//! Records `http_requests_total` (counter) and `http_request_duration_seconds`
//! (histogram) labelled by method and matched route. Scrapes of `/metrics`
//! itself and health probes are not counted.

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};

const UNTRACKED_PATHS: [&str; 2] = ["/metrics", "/health"];

pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    // Matched route keeps ids out of the label set; needs `route_layer`.
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    if UNTRACKED_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }
    let method = request.method().to_string();

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();

    metrics::counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    metrics::histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(duration);

    response
}
