//! Shared utilities for integration tests.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use config_registry::config::ServiceConfig;
use config_registry::store::MemoryBackend;
use config_registry::HttpServer;

/// A config the tests can run against: no rate limiting, no metrics
/// recorder (the recorder is process-global and tests spawn many servers).
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.rate_limit.enabled = false;
    config.observability.metrics_enabled = false;
    config
}

/// Spawn the service on an ephemeral port and return its base URL.
pub async fn spawn_service(config: ServiceConfig) -> String {
    let backend = Arc::new(MemoryBackend::new());
    let server = HttpServer::new(&config, backend);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server.run(listener).await.unwrap();
    });

    format!("http://{}", addr)
}

/// A well-formed config payload.
#[allow(dead_code)]
pub fn config_json(name: &str, version: u64, env: &str) -> Value {
    json!({
        "name": name,
        "version": version,
        "params": { "host": "localhost", "port": "5432" },
        "labels": { "env": env }
    })
}

/// A well-formed group payload with the given members.
#[allow(dead_code)]
pub fn group_json(name: &str, version: u64, members: Vec<Value>) -> Value {
    json!({
        "name": name,
        "version": version,
        "configurations": members
    })
}
