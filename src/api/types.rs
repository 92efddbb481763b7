//! Wire types for the `/chat-ai` endpoint.

use serde::{Deserialize, Serialize};

use crate::inference::Mode;

/// `{ "content": "...", "model": "openai" | "google" | "anthropic" | "combined" }`
///
/// `model` may be omitted, in which case the server's configured mode applies.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Mode>,
}

/// Success body: `{ "response": "..." }`
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub response: String,
}

/// Failure body: `{ "error": true, "message": "..." }`
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }
}
