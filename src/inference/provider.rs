use std::fmt;

use async_trait::async_trait;

use super::types::ProviderName;

/// Errors that can occur during a single adapter call.
/// Every variant names the provider so combined-mode logs stay legible.
#[derive(Debug)]
pub enum ProviderError {
    /// Network-level failure (timeout, DNS, connection refused).
    Network { provider: ProviderName, message: String },
    /// The provider returned an error envelope or a non-success status.
    Api {
        provider: ProviderName,
        status: u16,
        message: String,
    },
    /// A success status whose body is not JSON at all.
    Parse { provider: ProviderName, message: String },
}

impl ProviderError {
    pub fn provider(&self) -> ProviderName {
        match self {
            ProviderError::Network { provider, .. }
            | ProviderError::Api { provider, .. }
            | ProviderError::Parse { provider, .. } => *provider,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Network { message, .. } => write!(f, "{message}"),
            ProviderError::Api {
                provider, message, ..
            } => write!(f, "{provider} error: {message}"),
            ProviderError::Parse { provider, message } => {
                write!(f, "{provider} returned an unreadable response: {message}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// One upstream LLM vendor.
///
/// Implementations make exactly one outbound call per `invoke` and never retry.
/// Callers must only invoke an adapter when a non-empty credential exists.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this adapter talks to.
    fn provider(&self) -> ProviderName;

    /// Sends `prompt` and returns the reply as plain text.
    async fn invoke(&self, prompt: &str, credential: &str) -> Result<String, ProviderError>;
}
