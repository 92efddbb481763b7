//! Google adapter using the Gemini `generateContent` endpoint.
//! The API key travels as the `key` query parameter.

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};

use super::{Envelope, send};
use crate::inference::{ProviderAdapter, ProviderError, ProviderName};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-pro";
const TEMPERATURE: f64 = 0.7;

// ============================================================================
// Gemini API Types
// ============================================================================

#[derive(Serialize, Debug)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
}

/// The request body for `:generateContent`
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

impl Envelope for GenerateResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

fn build_request(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
        },
    }
}

// ============================================================================
// Adapter Implementation
// ============================================================================

pub struct GoogleAdapter {
    base_url: String,
    client: reqwest::Client,
}

impl GoogleAdapter {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for GoogleAdapter {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl ProviderAdapter for GoogleAdapter {
    fn provider(&self) -> ProviderName {
        ProviderName::Google
    }

    async fn invoke(&self, prompt: &str, credential: &str) -> Result<String, ProviderError> {
        info!("Google request: model={}, prompt_len={}", MODEL, prompt.len());

        let request = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, MODEL))
            .query(&[("key", credential)])
            .json(&build_request(prompt));

        send::<GenerateResponse>(ProviderName::Google, request).await
    }
}
