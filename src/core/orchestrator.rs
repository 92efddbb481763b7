//! # Orchestrator
//!
//! Fans one prompt out to the providers selected by [`Mode`] and the caller's
//! credentials, waits for every call to settle, then folds the outcomes into
//! a single reply.
//!
//! ```text
//! prompt, mode, credentials
//!         │
//!         ▼
//!   select providers ──(single mode, no key)──▶ Err(NotConfigured)
//!         │          ──(combined, no keys)───▶ Err(NoCredentials)
//!         │          ──(single mode, no adapter)─▶ Err(NoAdapter)
//!         ▼
//!   join_all(invoke…)      parallel, one call each
//!         │
//!         ▼
//!   fold in fixed order    openai → google → anthropic
//! ```
//!
//! Single-provider modes are strict: any adapter failure fails the call.
//! Combined mode is lenient: failed providers are logged and left out.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use log::{debug, info, warn};

use crate::core::config::ResolvedConfig;
use crate::inference::{
    AggregateReply, AnthropicAdapter, ComposeError, CredentialSet, GoogleAdapter, Mode,
    OpenAiAdapter, ProviderAdapter, ProviderName, ProviderResult,
};

/// Reply text for a combined call where every attempted provider failed.
pub const EMPTY_COMBINED_REPLY: &str = "No response was generated.";

/// Dispatch table of adapters keyed by provider.
#[derive(Clone)]
pub struct Orchestrator {
    adapters: BTreeMap<ProviderName, Arc<dyn ProviderAdapter>>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

impl Orchestrator {
    /// Builds an orchestrator over the three real adapters.
    /// `None` base URLs fall back to each provider's public endpoint.
    pub fn new(
        openai_base_url: Option<String>,
        google_base_url: Option<String>,
        anthropic_base_url: Option<String>,
    ) -> Self {
        Self::empty()
            .with_adapter(Arc::new(OpenAiAdapter::new(openai_base_url)))
            .with_adapter(Arc::new(GoogleAdapter::new(google_base_url)))
            .with_adapter(Arc::new(AnthropicAdapter::new(anthropic_base_url)))
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(
            Some(config.openai_base_url.clone()),
            Some(config.google_base_url.clone()),
            Some(config.anthropic_base_url.clone()),
        )
    }

    /// An orchestrator with no adapters registered.
    pub fn empty() -> Self {
        Self {
            adapters: BTreeMap::new(),
        }
    }

    /// Registers `adapter` under its own provider name, replacing any previous one.
    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(adapter.provider(), adapter);
        self
    }

    /// Answers `prompt` using the providers selected by `mode` and `credentials`.
    pub async fn compose(
        &self,
        prompt: &str,
        mode: Mode,
        credentials: &CredentialSet,
    ) -> AggregateReply {
        if prompt.trim().is_empty() {
            return Err(ComposeError::EmptyPrompt);
        }

        // A single-provider mode without its key is a configuration error,
        // not something to degrade around.
        if let Some(provider) = mode.single()
            && !credentials.has(provider)
        {
            warn!("{provider} requested but no API key is configured");
            return Err(ComposeError::NotConfigured(provider));
        }

        let selected: Vec<(ProviderName, &Arc<dyn ProviderAdapter>, &str)> = mode
            .candidates()
            .into_iter()
            .filter_map(|provider| {
                let credential = credentials.get(provider)?;
                match self.adapters.get(&provider) {
                    Some(adapter) => Some((provider, adapter, credential)),
                    None => {
                        warn!("No adapter registered for {provider}, skipping");
                        None
                    }
                }
            })
            .collect();

        info!(
            "Composing reply: mode={:?}, providers={:?}",
            mode,
            selected.iter().map(|(p, _, _)| *p).collect::<Vec<_>>()
        );

        if selected.is_empty() {
            return match mode.single() {
                Some(provider) => Err(ComposeError::NoAdapter(provider)),
                None if credentials.is_empty() => Err(ComposeError::NoCredentials),
                // Keys exist but none has an adapter: same as every attempt failing.
                None => Ok(combined_reply(Vec::new())),
            };
        }

        let outcomes = dispatch(prompt, &selected).await;

        match mode.single() {
            Some(_) => single_reply(outcomes),
            None => Ok(combined_reply(outcomes)),
        }
    }
}

/// Runs every selected adapter concurrently and waits for all of them.
/// Outcomes come back in selection order, whatever order they finished in.
async fn dispatch(
    prompt: &str,
    selected: &[(ProviderName, &Arc<dyn ProviderAdapter>, &str)],
) -> Vec<(ProviderName, ProviderResult)> {
    let calls = selected.iter().map(|(provider, adapter, credential)| async move {
        let result = adapter.invoke(prompt, credential).await;
        debug!("{provider} settled: ok={}", result.is_ok());
        (*provider, result)
    });
    join_all(calls).await
}

fn single_reply(outcomes: Vec<(ProviderName, ProviderResult)>) -> AggregateReply {
    match outcomes.into_iter().next() {
        Some((_, Ok(text))) => Ok(text),
        Some((provider, Err(err))) => {
            warn!("{provider} failed: {err}");
            Err(ComposeError::Provider(err))
        }
        None => Err(ComposeError::NoCredentials),
    }
}

/// Folds combined-mode outcomes into `"<Provider>: <text>"` sections.
fn combined_reply(mut outcomes: Vec<(ProviderName, ProviderResult)>) -> String {
    outcomes.sort_by_key(|(provider, _)| *provider);

    let sections: Vec<String> = outcomes
        .into_iter()
        .filter_map(|(provider, result)| match result {
            Ok(text) => Some(format!("{provider}: {text}")),
            Err(err) => {
                warn!("{provider} failed in combined mode, omitting: {err}");
                None
            }
        })
        .collect();

    if sections.is_empty() {
        EMPTY_COMBINED_REPLY.to_string()
    } else {
        sections.join("\n\n")
    }
}
