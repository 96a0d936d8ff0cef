mod manager;

pub use manager::{
    ChatConfig, ConfigFile, ConfigManager, DEFAULT_BIND, DEFAULT_ENDPOINT, DEFAULT_MODEL,
    DEFAULT_PROVIDER, DEFAULT_TEMPERATURE, ProviderConfig, ResolveOptions, ResolvedConfig,
    resolve_config,
};
