pub mod provider;
pub mod providers;
pub mod types;

pub use provider::{ProviderAdapter, ProviderError};
pub use providers::{AnthropicAdapter, GoogleAdapter, OpenAiAdapter, no_response_text};
pub use types::{AggregateReply, ComposeError, CredentialSet, Mode, ProviderName, ProviderResult};
