use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use super::client::{CompletionRequest, ModelBackend};
use super::error::PipelineError;
use super::prompt::PromptConfig;

/// Template, model call and answer extraction bundled into one callable.
///
/// Each [`invoke`](Self::invoke) is exactly one round trip to the backend:
/// no retries, no streaming, no caching.
pub struct ResponderPipeline {
    prompt: PromptConfig,
    backend: Arc<dyn ModelBackend>,
    timeout: Duration,
}

impl ResponderPipeline {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn new(prompt: PromptConfig, backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            prompt,
            backend,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub const fn prompt_config(&self) -> &PromptConfig {
        &self.prompt
    }

    pub fn endpoint(&self) -> &str {
        self.backend.endpoint()
    }

    pub async fn invoke(&self, question: &str) -> Result<String, PipelineError> {
        let request = CompletionRequest {
            model: self.prompt.model_identifier().to_string(),
            prompt: self.prompt.template().format(question),
            temperature: self.prompt.temperature(),
        };

        let started = Instant::now();
        let answer = tokio::time::timeout(self.timeout, self.backend.complete(&request))
            .await
            .map_err(|_| PipelineError::Timeout(self.timeout))??;

        debug!(
            model = %request.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "model call completed"
        );

        if answer.trim().is_empty() {
            return Err(PipelineError::ModelResponse(
                "backend returned an empty completion".to_string(),
            ));
        }

        Ok(answer)
    }
}
