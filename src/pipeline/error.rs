use std::time::Duration;

use thiserror::Error;

/// Rejected prompt configuration, reported when a `PromptConfig` is built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("prompt template must contain the {{question}} placeholder")]
    MissingPlaceholder,
    #[error("model identifier must not be empty")]
    EmptyModel,
    #[error("temperature {0} is outside the supported range 0.0..=2.0")]
    TemperatureOutOfRange(f32),
}

/// Failure of a single question/answer round trip.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The inference server could not be reached at all.
    #[error("model backend unavailable at {endpoint}: {source}")]
    ModelUnavailable {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The server answered, but not with a usable completion.
    #[error("model backend returned an unusable response: {0}")]
    ModelResponse(String),
    #[error("model backend did not answer within {0:?}")]
    Timeout(Duration),
}

impl PipelineError {
    /// Text shown to the user in place of an assistant answer.
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::ModelUnavailable { .. } => {
                "모델 서버에 연결할 수 없습니다. 잠시 후 다시 시도해 주세요."
            }
            Self::ModelResponse(_) => "모델이 올바른 답변을 주지 않았습니다. 다시 시도해 주세요.",
            Self::Timeout(_) => "답변이 너무 오래 걸립니다. 다시 시도해 주세요.",
        }
    }
}
