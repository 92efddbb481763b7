use std::collections::HashMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::provider::ProviderError;

/// One of the upstream LLM vendors.
///
/// The declaration order is the fixed order combined replies are assembled in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    OpenAi,
    Google,
    Anthropic,
}

impl ProviderName {
    /// Every provider, in combined-reply order.
    pub const ALL: [ProviderName; 3] = [
        ProviderName::OpenAi,
        ProviderName::Google,
        ProviderName::Anthropic,
    ];

    /// Human-readable label used in reply prefixes and error messages.
    pub fn label(self) -> &'static str {
        match self {
            ProviderName::OpenAi => "OpenAI",
            ProviderName::Google => "Google",
            ProviderName::Anthropic => "Anthropic",
        }
    }

    /// Lowercase identifier, as used on the wire and in config sections.
    pub fn id(self) -> &'static str {
        match self {
            ProviderName::OpenAi => "openai",
            ProviderName::Google => "google",
            ProviderName::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the caller asked for: one specific provider, or all of them merged.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[value(name = "openai")]
    OpenAi,
    Google,
    Anthropic,
    #[default]
    Combined,
}

impl Mode {
    /// Candidate providers before credential filtering.
    pub fn candidates(self) -> Vec<ProviderName> {
        match self.single() {
            Some(provider) => vec![provider],
            None => ProviderName::ALL.to_vec(),
        }
    }

    /// The mandatory provider for single-provider modes, `None` for combined.
    pub fn single(self) -> Option<ProviderName> {
        match self {
            Mode::OpenAi => Some(ProviderName::OpenAi),
            Mode::Google => Some(ProviderName::Google),
            Mode::Anthropic => Some(ProviderName::Anthropic),
            Mode::Combined => None,
        }
    }

    /// Parses the lowercase wire name (`"openai"`, `"combined"`, ...).
    pub fn parse(value: &str) -> Option<Mode> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Mode::OpenAi),
            "google" => Some(Mode::Google),
            "anthropic" => Some(Mode::Anthropic),
            "combined" => Some(Mode::Combined),
            _ => None,
        }
    }
}

impl From<ProviderName> for Mode {
    fn from(provider: ProviderName) -> Self {
        match provider {
            ProviderName::OpenAi => Mode::OpenAi,
            ProviderName::Google => Mode::Google,
            ProviderName::Anthropic => Mode::Anthropic,
        }
    }
}

/// Per-user API keys, keyed by provider.
///
/// An empty string is stored as given but reported as absent by [`CredentialSet::get`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    keys: HashMap<ProviderName, String>,
}

impl CredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, provider: ProviderName, key: impl Into<String>) -> Self {
        self.insert(provider, key);
        self
    }

    pub fn insert(&mut self, provider: ProviderName, key: impl Into<String>) {
        self.keys.insert(provider, key.into());
    }

    /// Returns the key for `provider` if present and non-empty.
    pub fn get(&self, provider: ProviderName) -> Option<&str> {
        self.keys
            .get(&provider)
            .map(String::as_str)
            .filter(|key| !key.trim().is_empty())
    }

    pub fn has(&self, provider: ProviderName) -> bool {
        self.get(provider).is_some()
    }

    /// Providers with a usable key, in fixed provider order.
    pub fn available(&self) -> Vec<ProviderName> {
        ProviderName::ALL
            .into_iter()
            .filter(|p| self.has(*p))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.available().is_empty()
    }
}

/// Outcome of one adapter call: the full reply text, or nothing at all.
pub type ProviderResult = Result<String, ProviderError>;

/// Call-level failures surfaced to the caller of `compose`.
#[derive(Debug)]
pub enum ComposeError {
    /// The prompt was empty or whitespace.
    EmptyPrompt,
    /// A single-provider mode was requested without a key for that provider.
    NotConfigured(ProviderName),
    /// Combined mode was requested and no provider has a key.
    NoCredentials,
    /// A provider has a key but no adapter is registered for it.
    NoAdapter(ProviderName),
    /// The mandatory provider of a single-provider mode failed.
    Provider(ProviderError),
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::EmptyPrompt => write!(f, "Message content must not be empty"),
            ComposeError::NotConfigured(provider) => {
                write!(f, "{provider} API key not configured")
            }
            ComposeError::NoCredentials => write!(
                f,
                "No API keys configured. Please add at least one API key in settings."
            ),
            ComposeError::NoAdapter(provider) => {
                write!(f, "No adapter registered for {provider}")
            }
            ComposeError::Provider(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ComposeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ComposeError::Provider(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProviderError> for ComposeError {
    fn from(err: ProviderError) -> Self {
        ComposeError::Provider(err)
    }
}

/// The final answer for one `compose` call.
pub type AggregateReply = Result<String, ComposeError>;
