//! Provider adapters plus the envelope handling they share.
//!
//! Every adapter funnels its HTTP response through [`read_reply`], so the
//! error/sentinel rules are identical across vendors:
//!
//! ```text
//! body has "error"            → ProviderError::Api  ("<Provider> error: ...")
//! non-2xx, no error envelope  → ProviderError::Api  (short body or "HTTP <status>")
//! 2xx, not JSON               → ProviderError::Parse
//! 2xx, text field missing     → Ok("No response from <Provider>")
//! ```

pub mod anthropic;
pub mod google;
pub mod openai;

pub use anthropic::AnthropicAdapter;
pub use google::GoogleAdapter;
pub use openai::OpenAiAdapter;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::inference::{ProviderError, ProviderName};

/// A provider's success body, reduced to the one text field we care about.
pub(crate) trait Envelope: DeserializeOwned {
    fn into_text(self) -> Option<String>;
}

/// Placeholder reply for a success body that carries no text.
pub fn no_response_text(provider: ProviderName) -> String {
    format!("No response from {provider}")
}

/// Sends the prepared request and turns the response into reply text.
pub(crate) async fn send<E: Envelope>(
    provider: ProviderName,
    request: reqwest::RequestBuilder,
) -> Result<String, ProviderError> {
    // reqwest errors embed the request URL, which carries Google's key
    let response = request.send().await.map_err(|e| ProviderError::Network {
        provider,
        message: e.without_url().to_string(),
    })?;

    let status = response.status().as_u16();
    debug!("{provider} response status: {status}");

    let body = response.text().await.map_err(|e| ProviderError::Network {
        provider,
        message: e.without_url().to_string(),
    })?;

    read_reply::<E>(provider, status, &body)
}

/// Applies the shared envelope rules to a raw response body.
pub(crate) fn read_reply<E: Envelope>(
    provider: ProviderName,
    status: u16,
    body: &str,
) -> Result<String, ProviderError> {
    let success = (200..300).contains(&status);

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) if success => {
            warn!("{provider} returned a non-JSON body: {e}");
            return Err(ProviderError::Parse {
                provider,
                message: e.to_string(),
            });
        }
        Err(_) => {
            warn!("{provider} API error: {status} - {}", truncate(body));
            return Err(ProviderError::Api {
                provider,
                status,
                message: fallback_message(status, body),
            });
        }
    };

    if let Some(message) = value.get("error").and_then(error_message) {
        warn!("{provider} API error: {status} - {message}");
        return Err(ProviderError::Api {
            provider,
            status,
            message,
        });
    }

    if !success {
        warn!("{provider} API error: {status} - {}", truncate(body));
        return Err(ProviderError::Api {
            provider,
            status,
            message: fallback_message(status, body),
        });
    }

    let text = match serde_json::from_value::<E>(value) {
        Ok(envelope) => envelope.into_text(),
        Err(e) => {
            debug!("{provider} envelope did not match: {e}");
            None
        }
    }
    .filter(|text| !text.is_empty());

    Ok(text.unwrap_or_else(|| {
        warn!("{provider} returned no text, substituting placeholder");
        no_response_text(provider)
    }))
}

/// Pulls a readable message out of an `error` field.
/// `null` and `false` mean "no error".
fn error_message(error: &Value) -> Option<String> {
    match error {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => Some(
            map.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
        ),
        other => Some(other.to_string()),
    }
}

/// Longest raw body excerpt carried in an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Short plain-text bodies pass through; empty or HTML bodies become `HTTP <status>`.
fn fallback_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() || body.starts_with('<') {
        format!("HTTP {status}")
    } else {
        truncate(body)
    }
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
