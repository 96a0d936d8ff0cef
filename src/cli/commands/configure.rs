//! Configure command handler for editing default chat settings.

use anyhow::{Result, bail};
use inquire::{InquireError, Select, Text};

use crate::config::{ChatConfig, ConfigFile, ConfigManager, DEFAULT_PROVIDER, DEFAULT_TEMPERATURE};
use crate::pipeline::TEMPERATURE_RANGE;
use crate::ui::Style;

/// The `[chat]` defaults this command edits.
#[derive(Debug, Clone, PartialEq)]
struct ChatDefaults {
    provider: String,
    model: String,
    temperature: f32,
}

impl ChatDefaults {
    fn apply(self, chat: &mut ChatConfig) {
        chat.provider = Some(self.provider);
        chat.model = Some(self.model);
        chat.temperature = Some(self.temperature);
    }
}

/// Interactively sets the default provider, model and temperature.
///
/// Esc or Ctrl+C at any prompt leaves the config file untouched.
pub fn run_configure() -> Result<()> {
    let manager = ConfigManager::new()?;
    let mut config = manager.load_or_default()?;

    print_current_defaults(&config.chat);

    let Some(defaults) = ask_defaults(&config)? else {
        println!();
        println!("{}", Style::detail("Cancelled, configuration unchanged."));
        return Ok(());
    };

    defaults.apply(&mut config.chat);
    manager.save(&config)?;

    println!();
    println!(
        "{} Configuration saved to {}",
        Style::saved(),
        Style::detail(manager.config_path().display())
    );

    Ok(())
}

/// Runs the prompts in order; `None` once the user backs out of any of them.
fn ask_defaults(config: &ConfigFile) -> Result<Option<ChatDefaults>> {
    let mut provider_names: Vec<String> = config.providers.keys().cloned().collect();
    if !config.providers.contains_key(DEFAULT_PROVIDER) {
        provider_names.push(DEFAULT_PROVIDER.to_string());
    }
    provider_names.sort();

    let Some(provider) = select_provider(&provider_names, config.chat.provider.as_deref())? else {
        return Ok(None);
    };

    let available_models = config
        .provider(&provider)
        .map(|p| p.models)
        .unwrap_or_default();
    let Some(model) = select_model(&available_models, config.chat.model.as_deref())? else {
        return Ok(None);
    };

    let Some(temperature) = prompt_temperature(config.chat.temperature)? else {
        return Ok(None);
    };

    Ok(Some(ChatDefaults {
        provider,
        model,
        temperature,
    }))
}

/// Turns a prompt result into its answer, or `None` if the user pressed Esc
/// or Ctrl+C.
fn answered<T>(result: std::result::Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn print_current_defaults(chat: &ChatConfig) {
    println!("{}", Style::heading("Current defaults"));
    println!(
        "  {}     {}",
        Style::setting("provider"),
        chat.provider.as_deref().map_or_else(Style::unset, Style::value)
    );
    println!(
        "  {}        {}",
        Style::setting("model"),
        chat.model.as_deref().map_or_else(Style::unset, Style::value)
    );
    println!(
        "  {}  {}",
        Style::setting("temperature"),
        chat.temperature.map_or_else(Style::unset, Style::value)
    );
    println!();
}

fn select_provider(providers: &[String], current: Option<&str>) -> Result<Option<String>> {
    let cursor = current
        .and_then(|c| providers.iter().position(|p| p == c))
        .unwrap_or(0);

    answered(
        Select::new("Default provider:", providers.to_vec())
            .with_starting_cursor(cursor)
            .prompt(),
    )
}

fn select_model(available_models: &[String], current: Option<&str>) -> Result<Option<String>> {
    if !available_models.is_empty() {
        let cursor = current
            .and_then(|c| available_models.iter().position(|m| m == c))
            .unwrap_or(0);

        return answered(
            Select::new("Default model:", available_models.to_vec())
                .with_starting_cursor(cursor)
                .prompt(),
        );
    }

    // The provider lists no models, so ask for a name.
    let mut prompt = Text::new("Default model:").with_help_message("e.g. gemma2:2b");
    if let Some(c) = current {
        prompt = prompt.with_default(c);
    }

    let Some(model) = answered(prompt.prompt())? else {
        return Ok(None);
    };
    let model = model.trim();
    if model.is_empty() {
        bail!("Model name cannot be empty");
    }
    Ok(Some(model.to_string()))
}

fn prompt_temperature(current: Option<f32>) -> Result<Option<f32>> {
    let default = current.unwrap_or(DEFAULT_TEMPERATURE).to_string();

    let answer = answered(
        Text::new("Temperature:")
            .with_help_message("Sampling randomness, 0.0 to 2.0")
            .with_default(&default)
            .prompt(),
    )?;

    answer.as_deref().map(parse_temperature).transpose()
}

fn parse_temperature(answer: &str) -> Result<f32> {
    let Ok(temperature) = answer.trim().parse::<f32>() else {
        bail!("Temperature must be a number, got '{}'", answer.trim());
    };

    if !TEMPERATURE_RANGE.contains(&temperature) {
        bail!("Temperature must be between 0.0 and 2.0, got {temperature}");
    }

    Ok(temperature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answered_passes_value_through() {
        assert_eq!(answered(Ok(0.5)).ok(), Some(Some(0.5)));
    }

    #[test]
    fn test_answered_treats_esc_and_ctrl_c_as_no_answer() {
        assert!(matches!(answered::<String>(Err(InquireError::OperationCanceled)), Ok(None)));
        assert!(matches!(
            answered::<String>(Err(InquireError::OperationInterrupted)),
            Ok(None)
        ));
    }

    #[test]
    fn test_answered_propagates_other_errors() {
        let result = answered::<String>(Err(InquireError::Custom("no tty".into())));
        let Err(err) = result else {
            panic!("expected an error");
        };
        assert!(err.to_string().contains("no tty"));
    }

    #[test]
    fn test_chat_defaults_overwrite_only_edited_settings() {
        let mut chat = ChatConfig {
            model: Some("llama3.2".to_string()),
            title: Some("My Bot".to_string()),
            ..ChatConfig::default()
        };

        ChatDefaults {
            provider: "ollama".to_string(),
            model: "gemma2:2b".to_string(),
            temperature: 0.3,
        }
        .apply(&mut chat);

        assert_eq!(chat.provider.as_deref(), Some("ollama"));
        assert_eq!(chat.model.as_deref(), Some("gemma2:2b"));
        assert_eq!(chat.temperature, Some(0.3));
        assert_eq!(chat.title.as_deref(), Some("My Bot"));
    }

    #[test]
    fn test_parse_temperature_valid() {
        assert!(parse_temperature("0.7").is_ok_and(|t| (t - 0.7).abs() < f32::EPSILON));
        assert!(parse_temperature(" 2 ").is_ok());
    }

    #[test]
    fn test_parse_temperature_rejects_out_of_range() {
        let err = parse_temperature("3").err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("between 0.0 and 2.0"));
    }

    #[test]
    fn test_parse_temperature_rejects_text() {
        assert!(parse_temperature("warm").is_err());
        assert!(parse_temperature("NaN").is_err());
    }
}
