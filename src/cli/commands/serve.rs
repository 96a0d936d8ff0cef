use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use super::{build_pipeline, load_config};
use crate::chat::SessionStore;
use crate::cli::ModelArgs;
use crate::web::{self, AppState};

pub async fn run_serve(model: &ModelArgs, bind: Option<String>) -> Result<()> {
    let config = load_config(model, bind)?;

    info!(
        provider = %config.provider_name,
        endpoint = %config.endpoint,
        model = %config.prompt.model_identifier(),
        temperature = config.prompt.temperature(),
        "using model backend"
    );

    let pipeline = Arc::new(build_pipeline(&config));
    let store = SessionStore::with_limits(pipeline, config.sessions);
    let state = AppState::new(store, config.page);

    web::serve(config.bind, state).await
}
