//! Middleware applied around the handlers.
//!
//! - `rate_limit`: global token-bucket admission (429 when empty)
//! - `idempotency`: at-most-once guard for mutating requests

pub mod idempotency;
pub mod rate_limit;
