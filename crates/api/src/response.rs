//! Shared response body types for API handlers.

use serde::Serialize;

/// `{ "message": "..." }` body returned by update and delete endpoints.
///
/// These endpoints report their outcome as text with a 200 status, even
/// when nothing was changed.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
