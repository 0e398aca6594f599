//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML, and every
//! section has a `Default` so a minimal (or absent) config file works.

use serde::{Deserialize, Serialize};

/// Root configuration for the registry service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Global request-rate admission.
    pub rate_limit: RateLimitConfig,

    /// Idempotency guard tuning.
    pub idempotency: IdempotencyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Global token-bucket rate limiting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Whether the limiter is applied at all.
    pub enabled: bool,

    /// Sustained refill rate, tokens per second.
    pub requests_per_second: f64,

    /// Bucket capacity (burst size).
    pub burst: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        // One request every ~6 seconds sustained, bursts of 10.
        Self {
            enabled: true,
            requests_per_second: 0.167,
            burst: 10.0,
        }
    }
}

/// Idempotency guard tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdempotencyConfig {
    /// Number of lock shards for check-and-set serialization.
    pub shards: usize,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self { shards: 64 }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Expose Prometheus metrics at `/metrics`.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}
