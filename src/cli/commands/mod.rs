//! Subcommand implementations.

use std::sync::Arc;

use anyhow::Result;

use super::args::ModelArgs;
use crate::config::{ConfigManager, ResolveOptions, ResolvedConfig, resolve_config};
use crate::pipeline::{OpenAiCompatBackend, ResponderPipeline};

/// One-shot question command handler.
pub mod ask;

/// Configure command handler.
pub mod configure;

/// Provider listing command handler.
pub mod providers;

/// Web server command handler.
pub mod serve;

/// Loads the config file and applies CLI overrides.
fn load_config(model: &ModelArgs, bind: Option<String>) -> Result<ResolvedConfig> {
    let manager = ConfigManager::new()?;
    let file_config = manager.load_or_default()?;

    let options = ResolveOptions {
        provider: model.provider.clone(),
        model: model.model.clone(),
        temperature: model.temperature,
        bind,
    };
    resolve_config(&options, &file_config)
}

fn build_pipeline(config: &ResolvedConfig) -> ResponderPipeline {
    let backend = OpenAiCompatBackend::new(config.endpoint.clone(), config.api_key.clone());
    ResponderPipeline::new(config.prompt.clone(), Arc::new(backend))
        .with_timeout(config.request_timeout)
}
