//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (rate limit, metrics, idempotency, tracing)
//! - Bind the server to a listener and serve until shutdown
//!
//! # Middleware order (outermost first)
//! ```text
//! trace → timeout → rate limit → idempotency guard → metrics → handler
//! ```
//! A request rejected by the guard is not counted, matching the original
//! service's middleware nesting.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::middleware::idempotency::idempotency_middleware;
use crate::http::middleware::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::idempotency::IdempotencyGuard;
use crate::lifecycle::shutdown::signal_received;
use crate::observability::metrics as registry_metrics;
use crate::store::{EntityStore, KvBackend};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: EntityStore,
    pub guard: IdempotencyGuard,
    pub limiter: Option<Arc<RateLimiter>>,
    pub metrics: Option<PrometheusHandle>,
}

/// HTTP server for the configuration registry.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Assemble the server over the given backend.
    pub fn new(config: &ServiceConfig, backend: Arc<dyn KvBackend>) -> Self {
        let limiter = config.rate_limit.enabled.then(|| {
            Arc::new(RateLimiter::new(
                config.rate_limit.requests_per_second,
                config.rate_limit.burst,
            ))
        });
        let metrics = config
            .observability
            .metrics_enabled
            .then(registry_metrics::install_recorder)
            .flatten();

        let state = AppState {
            store: EntityStore::new(backend.clone()),
            guard: IdempotencyGuard::new(backend, config.idempotency.shards),
            limiter,
            metrics,
        };

        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let api = Router::new()
            .route("/configs", post(handlers::config::add_config))
            .route(
                "/configs/{name}/{version}",
                get(handlers::config::get_config).delete(handlers::config::delete_config),
            )
            .route("/configGroups", post(handlers::group::add_config_group))
            .route(
                "/configGroups/{group_name}/{group_version}",
                get(handlers::group::get_config_group)
                    .post(handlers::group::add_config_to_group)
                    .delete(handlers::group::delete_config_group),
            )
            // The third segment is overloaded by the API: a label query on
            // the three-segment form, a member name on the four-segment
            // form. The router needs one name per position, extraction is
            // positional either way.
            .route(
                "/configGroups/{group_name}/{group_version}/{selector}",
                get(handlers::group::get_configs_by_label)
                    .delete(handlers::group::delete_configs_by_label),
            )
            .route(
                "/configGroups/{group_name}/{group_version}/{selector}/{config_version}",
                delete(handlers::group::delete_config_from_group),
            )
            // Innermost layers run closest to the handler.
            .layer(middleware::from_fn(registry_metrics::track_requests))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                idempotency_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http());

        // The metrics endpoint sits outside rate limiting and the guard.
        api.route("/metrics", get(metrics_handler)).with_state(state)
    }

    /// Run the server, accepting connections on the given listener until
    /// a shutdown signal arrives.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signal_received())
            .await
    }
}

/// Prometheus exposition.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
