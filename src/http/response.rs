//! Response shaping helpers.
//!
//! Create and read operations echo the entity as JSON; delete operations
//! answer with a one-line message envelope.

use axum::Json;
use serde::Serialize;

/// Envelope for status-message responses.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

/// Build a `{"message": ...}` JSON response body.
pub fn message(text: &str) -> Json<Message> {
    Json(Message {
        message: text.to_string(),
    })
}
