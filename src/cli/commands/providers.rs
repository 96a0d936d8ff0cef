//! Provider listing command handler.

use anyhow::Result;

use crate::config::{ConfigFile, ConfigManager, DEFAULT_PROVIDER, ProviderConfig};
use crate::ui::Style;

/// Prints configured providers to stdout.
///
/// With `specific_provider`, shows that provider in detail. Otherwise lists
/// every provider; the built-in Ollama entry is listed when none are configured.
pub fn print_providers(specific_provider: Option<&str>) -> Result<()> {
    let manager = ConfigManager::new()?;
    let config = manager.load_or_default()?;
    let default_provider = config.chat.provider.as_deref().unwrap_or(DEFAULT_PROVIDER);

    if let Some(name) = specific_provider {
        let provider = config
            .provider(name)
            .ok_or_else(|| anyhow::anyhow!("Provider '{name}' not found"))?;
        print_provider_details(name, &provider, default_provider == name);
        return Ok(());
    }

    println!("{}\n", Style::heading("Configured providers"));
    for (name, provider) in sorted_providers(&config) {
        let marker = if name == default_provider {
            format!(" {}", Style::default_marker())
        } else {
            String::new()
        };
        println!("  {}{marker}", Style::value(&name));
        println!("    endpoint: {}", Style::detail(&provider.endpoint));
        if !provider.models.is_empty() {
            println!("    models: {}", provider.models.join(", "));
        }
    }

    Ok(())
}

fn print_provider_details(name: &str, provider: &ProviderConfig, is_default: bool) {
    println!(
        "Provider: {}{}",
        Style::value(name),
        if is_default { " (default)" } else { "" }
    );
    println!("  endpoint = {}", provider.endpoint);
    if provider.requires_api_key() {
        let has_key = provider.get_api_key().is_some();
        println!(
            "  api_key  = {}",
            if has_key { "(set)" } else { "(not set)" }
        );
    }
    if provider.models.is_empty() {
        println!("  models   = (none configured)");
    } else {
        println!("  models:");
        for model in &provider.models {
            println!("    - {model}");
        }
    }
}

/// Providers by name, including the built-in one when nothing overrides it.
fn sorted_providers(config: &ConfigFile) -> Vec<(String, ProviderConfig)> {
    let mut providers: Vec<_> = config
        .providers
        .iter()
        .map(|(name, p)| (name.clone(), p.clone()))
        .collect();

    if !config.providers.contains_key(DEFAULT_PROVIDER) {
        providers.push((DEFAULT_PROVIDER.to_string(), ProviderConfig::builtin_ollama()));
    }

    providers.sort_by(|a, b| a.0.cmp(&b.0));
    providers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_providers_includes_builtin() {
        let providers = sorted_providers(&ConfigFile::default());
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].0, DEFAULT_PROVIDER);
    }

    #[test]
    fn test_sorted_providers_prefers_configured_ollama() {
        let mut config = ConfigFile::default();
        let mut custom = ProviderConfig::builtin_ollama();
        custom.endpoint = "http://gpu-box:11434".to_string();
        config.providers.insert("ollama".to_string(), custom);
        config
            .providers
            .insert("lmstudio".to_string(), ProviderConfig::builtin_ollama());

        let providers = sorted_providers(&config);
        let names: Vec<_> = providers.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["lmstudio", "ollama"]);
        assert_eq!(providers[1].1.endpoint, "http://gpu-box:11434");
    }
}
