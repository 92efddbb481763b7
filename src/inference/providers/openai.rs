//! OpenAI adapter using the Chat Completions API.
//!
//! Only the OpenAI adapter frames the prompt with a system message.

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};

use super::{Envelope, send};
use crate::inference::{ProviderAdapter, ProviderError, ProviderName};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f64 = 0.7;
const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

// ============================================================================
// Chat Completions API Types
// ============================================================================

/// Role in a chat message
#[derive(Serialize, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum Role {
    System,
    User,
}

#[derive(Serialize, Debug)]
struct Message<'a> {
    role: Role,
    content: &'a str,
}

/// The request body for `/chat/completions`
#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'static str,
    messages: Vec<Message<'a>>,
    temperature: f64,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: Option<String>,
}

impl Envelope for ChatResponse {
    fn into_text(self) -> Option<String> {
        self.choices.into_iter().next()?.message?.content
    }
}

fn build_request(prompt: &str) -> ChatRequest<'_> {
    ChatRequest {
        model: MODEL,
        messages: vec![
            Message {
                role: Role::System,
                content: SYSTEM_PROMPT,
            },
            Message {
                role: Role::User,
                content: prompt,
            },
        ],
        temperature: TEMPERATURE,
    }
}

// ============================================================================
// Adapter Implementation
// ============================================================================

pub struct OpenAiAdapter {
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiAdapter {
    /// Creates a new OpenAI adapter.
    ///
    /// # Arguments
    /// * `base_url` - Optional custom base URL (defaults to OpenAI's API)
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for OpenAiAdapter {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn provider(&self) -> ProviderName {
        ProviderName::OpenAi
    }

    async fn invoke(&self, prompt: &str, credential: &str) -> Result<String, ProviderError> {
        let body = build_request(prompt);
        info!(
            "OpenAI request: model={}, prompt_len={}",
            body.model,
            prompt.len()
        );

        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(credential)
            .json(&body);

        send::<ChatResponse>(ProviderName::OpenAi, request).await
    }
}
