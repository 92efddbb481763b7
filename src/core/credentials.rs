//! Where per-user API keys come from.
//!
//! The orchestrator never stores keys; callers look them up here right before
//! each `compose` call, so a rotated key is picked up on the next request.

use crate::core::config::api_key_var;
use crate::inference::{CredentialSet, ProviderName};

/// Read-only lookup of a user's API keys.
pub trait CredentialStore: Send + Sync {
    fn credentials(&self, user_id: &str) -> CredentialSet;
}

/// Same keys for every user.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    credentials: CredentialSet,
}

impl StaticCredentialStore {
    pub fn new(credentials: CredentialSet) -> Self {
        Self { credentials }
    }
}

impl CredentialStore for StaticCredentialStore {
    fn credentials(&self, _user_id: &str) -> CredentialSet {
        self.credentials.clone()
    }
}

/// Process environment first (`OPENAI_API_KEY`, ...), config file keys second.
///
/// The environment is re-read on every lookup.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialStore {
    fallback: CredentialSet,
}

impl EnvCredentialStore {
    pub fn new(fallback: CredentialSet) -> Self {
        Self { fallback }
    }
}

impl CredentialStore for EnvCredentialStore {
    fn credentials(&self, _user_id: &str) -> CredentialSet {
        merge(&self.fallback, |provider| std::env::var(api_key_var(provider)).ok())
    }
}

/// Overlays keys from `lookup` onto `fallback`; empty lookups don't shadow.
fn merge(fallback: &CredentialSet, lookup: impl Fn(ProviderName) -> Option<String>) -> CredentialSet {
    let mut creds = CredentialSet::new();
    for provider in ProviderName::ALL {
        let key = lookup(provider)
            .filter(|k| !k.trim().is_empty())
            .or_else(|| fallback.get(provider).map(str::to_string));
        if let Some(key) = key {
            creds.insert(provider, key);
        }
    }
    creds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_store_ignores_user() {
        let store = StaticCredentialStore::new(CredentialSet::new().with(ProviderName::Google, "g"));
        assert_eq!(store.credentials("alice"), store.credentials("bob"));
        assert_eq!(store.credentials("alice").get(ProviderName::Google), Some("g"));
    }

    #[test]
    fn test_env_store_sees_rotated_key() {
        let var = api_key_var(ProviderName::Google);
        let store = EnvCredentialStore::new(CredentialSet::new().with(ProviderName::Google, "file-key"));

        // Only this test touches GOOGLE_API_KEY.
        unsafe { std::env::set_var(var, "env-key-1") };
        assert_eq!(store.credentials("u").get(ProviderName::Google), Some("env-key-1"));

        unsafe { std::env::set_var(var, "env-key-2") };
        assert_eq!(store.credentials("u").get(ProviderName::Google), Some("env-key-2"));

        unsafe { std::env::remove_var(var) };
        assert_eq!(store.credentials("u").get(ProviderName::Google), Some("file-key"));
    }

    #[test]
    fn test_merge_prefers_lookup() {
        let fallback = CredentialSet::new()
            .with(ProviderName::OpenAi, "file-openai")
            .with(ProviderName::Anthropic, "file-ant");
        let merged = merge(&fallback, |p| match p {
            ProviderName::OpenAi => Some("env-openai".to_string()),
            ProviderName::Anthropic => Some(String::new()),
            ProviderName::Google => None,
        });

        assert_eq!(merged.get(ProviderName::OpenAi), Some("env-openai"));
        assert_eq!(merged.get(ProviderName::Anthropic), Some("file-ant"));
        assert_eq!(merged.get(ProviderName::Google), None);
    }
}
