//! # Prometheus Metrics
//!
//! Request metrics recorded through the `metrics` facade. The binary
//! installs a Prometheus recorder and this module serves its rendering at
//! `/metrics`. Without an installed recorder the macros are no-ops, which
//! is what unit tests run with.
//!
//! Domain counters recorded elsewhere:
//! - `folio_side_effect_failures_total{sink}`
//! - `folio_assistant_replies_total{source}`
//! - `folio_uploaded_bytes_total`

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder.
pub fn install_recorder() -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Middleware that counts requests and records their latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(started.elapsed().as_secs_f64());

    response
}

/// `GET /metrics` rendering the Prometheus text format.
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(render))
        .layer(Extension(handle))
}

async fn render(Extension(handle): Extension<PrometheusHandle>) -> String {
    handle.render()
}
