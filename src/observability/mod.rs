//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! handlers/middleware produce:
//!     → tracing events (structured logs, stdout)
//!     → metrics.rs (per-endpoint request counters)
//!
//! Consumers:
//!     → log aggregation (stdout)
//!     → Prometheus scrape of GET /metrics
//! ```
//!
//! # Design Decisions
//! - Metrics are cheap (atomic increments via the `metrics` facade)
//! - Counter labels use the route template, not the concrete path, to
//!   keep cardinality bounded

pub mod metrics;
