//! Global rate limiting middleware.
//!
//! One token bucket guards the whole API surface, mirroring the original
//! service's single shared limiter. Requests that find the bucket empty
//! receive 429 with a JSON message.

use std::sync::Mutex;
use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::http::server::AppState;

/// A simple token bucket.
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Shared global limiter state.
pub struct RateLimiter {
    bucket: Mutex<TokenBucket>,
    refill_rate: f64,
    capacity: f64,
}

impl RateLimiter {
    /// Create a limiter refilling at `requests_per_second` with the given
    /// burst capacity.
    pub fn new(requests_per_second: f64, burst: f64) -> Self {
        Self {
            bucket: Mutex::new(TokenBucket::new(burst)),
            refill_rate: requests_per_second,
            capacity: burst,
        }
    }

    /// Take one token if available.
    pub fn allow(&self) -> bool {
        let mut bucket = self.bucket.lock().expect("rate limiter mutex poisoned");
        bucket.try_acquire(self.capacity, self.refill_rate)
    }
}

/// Middleware applying the global limiter, when one is configured.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(limiter) = &state.limiter {
        if !limiter.allow() {
            tracing::warn!(path = %request.uri().path(), "rate limit exceeded");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "message": "Rate limit exceeded, try again later!" })),
            )
                .into_response();
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_empty() {
        let limiter = RateLimiter::new(0.0, 3.0);
        assert!(limiter.allow());
        assert!(limiter.allow());
        assert!(limiter.allow());
        assert!(!limiter.allow());
    }

    #[test]
    fn test_refill_over_time() {
        let limiter = RateLimiter::new(1000.0, 1.0);
        assert!(limiter.allow());
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(limiter.allow());
    }
}
