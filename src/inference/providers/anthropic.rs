//! Anthropic adapter using the Messages API.

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};

use super::{Envelope, send};
use crate::inference::{ProviderAdapter, ProviderError, ProviderName};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const MODEL: &str = "claude-3-haiku-20240307";
const MAX_TOKENS: u32 = 1000;
const API_VERSION: &str = "2023-06-01";

// ============================================================================
// Messages API Types
// ============================================================================

#[derive(Serialize, Debug)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// The request body for `/messages`
#[derive(Serialize, Debug)]
struct MessagesRequest<'a> {
    model: &'static str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize, Debug)]
struct ContentBlock {
    text: Option<String>,
}

impl Envelope for MessagesResponse {
    fn into_text(self) -> Option<String> {
        self.content.into_iter().next()?.text
    }
}

fn build_request(prompt: &str) -> MessagesRequest<'_> {
    MessagesRequest {
        model: MODEL,
        messages: vec![Message {
            role: "user",
            content: prompt,
        }],
        max_tokens: MAX_TOKENS,
    }
}

// ============================================================================
// Adapter Implementation
// ============================================================================

pub struct AnthropicAdapter {
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicAdapter {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for AnthropicAdapter {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn provider(&self) -> ProviderName {
        ProviderName::Anthropic
    }

    async fn invoke(&self, prompt: &str, credential: &str) -> Result<String, ProviderError> {
        let body = build_request(prompt);
        info!(
            "Anthropic request: model={}, max_tokens={}, prompt_len={}",
            body.model,
            body.max_tokens,
            prompt.len()
        );

        let request = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", credential)
            .header("anthropic-version", API_VERSION)
            .json(&body);

        send::<MessagesResponse>(ProviderName::Anthropic, request).await
    }
}
