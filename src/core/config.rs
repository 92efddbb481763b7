//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.chorus/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::inference::providers;
use crate::inference::{CredentialSet, Mode, ProviderName};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChorusConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub openai: ProviderConfig,
    #[serde(default)]
    pub google: ProviderConfig,
    #[serde(default)]
    pub anthropic: ProviderConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub default_mode: Option<Mode>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl ChorusConfig {
    pub fn provider(&self, provider: ProviderName) -> &ProviderConfig {
        match provider {
            ProviderName::OpenAi => &self.openai,
            ProviderName::Google => &self.google,
            ProviderName::Anthropic => &self.anthropic,
        }
    }

    /// API keys written in the config file, ignoring the environment.
    pub fn file_credentials(&self) -> CredentialSet {
        let mut creds = CredentialSet::new();
        for provider in ProviderName::ALL {
            if let Some(key) = &self.provider(provider).api_key {
                creds.insert(provider, key.clone());
            }
        }
        creds
    }
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub mode: Mode,
    pub bind: String,
    pub openai_base_url: String,
    pub google_base_url: String,
    pub anthropic_base_url: String,
    /// Keys from the config file only; the environment is consulted per request.
    pub file_credentials: CredentialSet,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.chorus/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".chorus").join("config.toml"))
}

/// Load config from `~/.chorus/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ChorusConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ChorusConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ChorusConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(ChorusConfig::default());
    }

    load_config_from(&path)
}

/// Parse a config file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<ChorusConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ChorusConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    // Debug output of the config would include API keys
    debug!(
        "Config: default_mode={:?}, bind={:?}",
        config.general.default_mode, config.server.bind
    );
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Chorus Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# default_mode = "combined"          # "openai", "google", "anthropic" or "combined"

# [server]
# bind = "127.0.0.1:8787"            # Or set CHORUS_BIND

# [openai]
# api_key = "sk-..."                 # Or set OPENAI_API_KEY
# base_url = "https://api.openai.com/v1"

# [google]
# api_key = "AIza..."                # Or set GOOGLE_API_KEY
# base_url = "https://generativelanguage.googleapis.com/v1beta"

# [anthropic]
# api_key = "sk-ant-..."             # Or set ANTHROPIC_API_KEY
# base_url = "https://api.anthropic.com/v1"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Environment variable holding `provider`'s API key.
pub fn api_key_var(provider: ProviderName) -> &'static str {
    match provider {
        ProviderName::OpenAi => "OPENAI_API_KEY",
        ProviderName::Google => "GOOGLE_API_KEY",
        ProviderName::Anthropic => "ANTHROPIC_API_KEY",
    }
}

fn base_url_var(provider: ProviderName) -> &'static str {
    match provider {
        ProviderName::OpenAi => "OPENAI_BASE_URL",
        ProviderName::Google => "GOOGLE_BASE_URL",
        ProviderName::Anthropic => "ANTHROPIC_BASE_URL",
    }
}

fn default_base_url(provider: ProviderName) -> &'static str {
    match provider {
        ProviderName::OpenAi => providers::openai::DEFAULT_BASE_URL,
        ProviderName::Google => providers::google::DEFAULT_BASE_URL,
        ProviderName::Anthropic => providers::anthropic::DEFAULT_BASE_URL,
    }
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_mode` and `cli_bind` are from CLI flags (None = not specified).
pub fn resolve(config: &ChorusConfig, cli_mode: Option<Mode>, cli_bind: Option<&str>) -> ResolvedConfig {
    // Mode: CLI → env → config → default
    let mode = cli_mode
        .or_else(|| {
            let raw = std::env::var("CHORUS_MODE").ok()?;
            let parsed = Mode::parse(&raw);
            if parsed.is_none() {
                warn!("Ignoring unknown CHORUS_MODE value: {raw}");
            }
            parsed
        })
        .or(config.general.default_mode)
        .unwrap_or_default();

    // Bind address: CLI → env → config → default
    let bind = cli_bind
        .map(|s| s.to_string())
        .or_else(|| std::env::var("CHORUS_BIND").ok())
        .or_else(|| config.server.bind.clone())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());

    // Base URLs: env → config → default
    let base_url = |provider: ProviderName| {
        std::env::var(base_url_var(provider))
            .ok()
            .or_else(|| config.provider(provider).base_url.clone())
            .unwrap_or_else(|| default_base_url(provider).to_string())
    };

    ResolvedConfig {
        mode,
        bind,
        openai_base_url: base_url(ProviderName::OpenAi),
        google_base_url: base_url(ProviderName::Google),
        anthropic_base_url: base_url(ProviderName::Anthropic),
        file_credentials: config.file_credentials(),
    }
}
