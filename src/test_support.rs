//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::orchestrator::Orchestrator;
use crate::inference::{ProviderAdapter, ProviderError, ProviderName};

/// Scripted adapter that records its calls instead of hitting the network.
pub struct MockAdapter {
    provider: ProviderName,
    reply: Result<String, String>,
    delay: Duration,
    calls: AtomicUsize,
    last_call: Mutex<Option<(String, String)>>,
}

impl MockAdapter {
    fn build(provider: ProviderName, reply: Result<String, String>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            provider,
            reply,
            delay,
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        })
    }

    pub fn replying(provider: ProviderName, text: &str) -> Arc<Self> {
        Self::build(provider, Ok(text.to_string()), Duration::ZERO)
    }

    /// Fails every call with an API error carrying `message`.
    pub fn failing(provider: ProviderName, message: &str) -> Arc<Self> {
        Self::build(provider, Err(message.to_string()), Duration::ZERO)
    }

    pub fn delayed(provider: ProviderName, text: &str, delay: Duration) -> Arc<Self> {
        Self::build(provider, Ok(text.to_string()), delay)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(prompt, credential)` of the most recent call.
    pub fn last_call(&self) -> Option<(String, String)> {
        self.last_call.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderAdapter for MockAdapter {
    fn provider(&self) -> ProviderName {
        self.provider
    }

    async fn invoke(&self, prompt: &str, credential: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap() = Some((prompt.to_string(), credential.to_string()));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.reply.clone().map_err(|message| ProviderError::Api {
            provider: self.provider,
            status: 400,
            message,
        })
    }
}

/// An orchestrator whose three adapters answer `"<id> says hi"`.
/// The returned mocks are in provider order.
pub fn mock_orchestrator() -> (Orchestrator, Vec<Arc<MockAdapter>>) {
    let mocks: Vec<Arc<MockAdapter>> = ProviderName::ALL
        .into_iter()
        .map(|p| MockAdapter::replying(p, &format!("{} says hi", p.id())))
        .collect();

    let orchestrator = mocks
        .iter()
        .fold(Orchestrator::empty(), |o, m| o.with_adapter(m.clone()));

    (orchestrator, mocks)
}
