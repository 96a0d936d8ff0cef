//! Question-to-answer pipeline: prompt template, model call, answer extraction.

mod client;
mod error;
mod prompt;
mod responder;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{CompletionRequest, ModelBackend, OpenAiCompatBackend};
pub use error::{ConfigError, PipelineError};
pub use prompt::{
    DEFAULT_TEMPLATE, PromptConfig, PromptTemplate, QUESTION_PLACEHOLDER, TEMPERATURE_RANGE,
};
pub use responder::ResponderPipeline;
