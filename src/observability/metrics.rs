//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, endpoint, status
//!
//! # Design Decisions
//! - The `metrics` facade keeps call sites decoupled from the exporter
//! - Exposition is Prometheus text format at `GET /metrics`
//! - Installing the recorder can only happen once per process; callers
//!   treat a second install (e.g., several servers in one test binary)
//!   as "metrics off" rather than an error

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder.
///
/// Returns `None` when a recorder is already installed in this process.
pub fn install_recorder() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::warn!(error = %err, "metrics recorder not installed");
            None
        }
    }
}

/// Middleware counting every request by method, route template and status.
pub async fn track_requests(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    // Route template keeps label cardinality bounded; fall back to the
    // raw path for unmatched requests.
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    counter!("http_requests_total", "method" => method, "endpoint" => endpoint, "status" => status)
        .increment(1);

    response
}
