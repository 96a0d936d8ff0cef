use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::chat::SessionLimits;
use crate::fs::atomic_write;
use crate::paths;
use crate::pipeline::{DEFAULT_TEMPLATE, PromptConfig, ResponderPipeline};
use crate::web::PageConfig;
use crate::web::page::{DEFAULT_ICON, DEFAULT_TITLE};

pub const DEFAULT_PROVIDER: &str = "ollama";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "gemma2:2b";
pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// Default settings in the `[chat]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Default provider name.
    pub provider: Option<String>,
    /// Default model name.
    pub model: Option<String>,
    /// Sampling temperature, `0.0..=2.0`.
    pub temperature: Option<f32>,
    /// Prompt template containing `{question}`.
    pub template: Option<String>,
    /// Page title.
    pub title: Option<String>,
    /// Page icon (an emoji).
    pub icon: Option<String>,
    /// Listen address of the web server.
    pub bind: Option<String>,
    /// Upper bound for one model call, in seconds.
    pub timeout_secs: Option<u64>,
    /// Seconds without a request after which a session is dropped.
    pub session_idle_secs: Option<u64>,
    /// Most sessions kept at once.
    pub max_sessions: Option<usize>,
}

/// Configuration for a model provider.
///
/// Each provider has an endpoint and optional API key settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The OpenAI-compatible API endpoint URL.
    pub endpoint: String,
    /// API key stored directly in config (not recommended).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// List of available models for this provider.
    #[serde(default)]
    pub models: Vec<String>,
}

impl ProviderConfig {
    /// The provider used when nothing is configured: a local Ollama server.
    pub fn builtin_ollama() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            api_key_env: None,
            models: vec![DEFAULT_MODEL.to_string()],
        }
    }

    /// Gets the API key, preferring environment variable over config file.
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(env_var) = &self.api_key_env
            && let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone()
    }

    /// Returns `true` if this provider requires an API key.
    pub const fn requires_api_key(&self) -> bool {
        self.api_key.is_some() || self.api_key_env.is_some()
    }
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/gazzi/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Default settings.
    #[serde(default)]
    pub chat: ChatConfig,
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl ConfigFile {
    /// Looks up a provider, falling back to the built-in Ollama entry.
    pub fn provider(&self, name: &str) -> Option<ProviderConfig> {
        self.providers.get(name).cloned().or_else(|| {
            (name == DEFAULT_PROVIDER).then(ProviderConfig::builtin_ollama)
        })
    }
}

/// Resolved configuration after merging CLI arguments and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The selected provider name.
    pub provider_name: String,
    /// The API endpoint URL.
    pub endpoint: String,
    /// The API key (if required).
    pub api_key: Option<String>,
    /// Validated template, model and temperature.
    pub prompt: PromptConfig,
    pub page: PageConfig,
    pub bind: SocketAddr,
    pub request_timeout: Duration,
    pub sessions: SessionLimits,
}

/// Options for resolving configuration.
///
/// Contains CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Provider name override.
    pub provider: Option<String>,
    /// Model name override.
    pub model: Option<String>,
    /// Temperature override.
    pub temperature: Option<f32>,
    /// Listen address override.
    pub bind: Option<String>,
}

/// Resolves configuration by merging CLI options with config file settings.
///
/// Priority: CLI options, then config file, then built-in defaults.
///
/// # Errors
///
/// Returns an error if the provider is unknown, a required API key is
/// missing, the bind address is invalid, or the prompt settings fail
/// validation.
pub fn resolve_config(
    options: &ResolveOptions,
    config_file: &ConfigFile,
) -> Result<ResolvedConfig> {
    let chat = &config_file.chat;

    let provider_name = options
        .provider
        .as_ref()
        .or(chat.provider.as_ref())
        .cloned()
        .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

    let provider_config = config_file.provider(&provider_name).ok_or_else(|| {
        let mut available: Vec<_> = config_file.providers.keys().map(String::as_str).collect();
        available.sort_unstable();
        if available.is_empty() {
            anyhow::anyhow!(
                "Provider '{provider_name}' not found\n\n\
                 No providers configured. Add providers to ~/.config/gazzi/config.toml"
            )
        } else {
            anyhow::anyhow!(
                "Provider '{provider_name}' not found\n\n\
                 Available providers:\n  \
                 - {}\n\n\
                 Add providers to ~/.config/gazzi/config.toml",
                available.join("\n  - ")
            )
        }
    })?;

    let model = options
        .model
        .as_ref()
        .or(chat.model.as_ref())
        .cloned()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    // Warn if model is not in provider's models list
    if !provider_config.models.is_empty() && !provider_config.models.contains(&model) {
        warn!(
            model = %model,
            provider = %provider_name,
            configured = %provider_config.models.join(", "),
            "model is not in the configured models list; proceeding anyway"
        );
    }

    let temperature = options
        .temperature
        .or(chat.temperature)
        .unwrap_or(DEFAULT_TEMPERATURE);
    let template = chat.template.as_deref().unwrap_or(DEFAULT_TEMPLATE);

    let prompt = PromptConfig::new(template, &model, temperature)
        .context("Invalid prompt configuration")?;

    let api_key = provider_config.get_api_key();

    // Check if API key is required but missing
    if provider_config.requires_api_key() && api_key.is_none() {
        let env_var = provider_config.api_key_env.as_deref().unwrap_or("API_KEY");
        bail!(
            "Provider '{provider_name}' requires an API key\n\n\
             Set the {env_var} environment variable:\n  \
             export {env_var}=\"your-api-key\"\n\n\
             Or set api_key in ~/.config/gazzi/config.toml"
        );
    }

    let bind = options
        .bind
        .as_deref()
        .or(chat.bind.as_deref())
        .unwrap_or(DEFAULT_BIND);
    let bind: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address: '{bind}'"))?;

    let request_timeout = chat
        .timeout_secs
        .map_or(ResponderPipeline::DEFAULT_TIMEOUT, Duration::from_secs);
    if request_timeout.is_zero() {
        bail!("timeout_secs must be greater than zero");
    }

    let sessions = SessionLimits {
        idle_timeout: chat
            .session_idle_secs
            .map_or(SessionLimits::DEFAULT_IDLE_TIMEOUT, Duration::from_secs),
        max_sessions: chat.max_sessions.unwrap_or(SessionLimits::DEFAULT_MAX_SESSIONS),
    };
    if sessions.idle_timeout.is_zero() {
        bail!("session_idle_secs must be greater than zero");
    }
    if sessions.max_sessions == 0 {
        bail!("max_sessions must be greater than zero");
    }

    let page = PageConfig {
        title: chat.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        icon: chat.icon.clone().unwrap_or_else(|| DEFAULT_ICON.to_string()),
    };

    Ok(ResolvedConfig {
        provider_name,
        endpoint: provider_config.endpoint,
        api_key,
        prompt,
        page,
        bind,
        request_timeout,
        sessions,
    })
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager.
    ///
    /// Configuration is stored at `$XDG_CONFIG_HOME/gazzi/config.toml`
    /// or `~/.config/gazzi/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config_file: ConfigFile = toml::from_str(&contents).with_context(|| {
            format!("Failed to parse config file: {}", self.config_path.display())
        })?;

        Ok(config_file)
    }

    /// Loads the config file, treating a missing file as an empty config.
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        match fs::metadata(&self.config_path) {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ConfigFile::default()),
            _ => self.load(),
        }
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

        atomic_write(&self.config_path, &contents).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })
    }
}
