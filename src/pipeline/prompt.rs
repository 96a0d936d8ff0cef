use std::ops::RangeInclusive;

use super::error::ConfigError;

pub const QUESTION_PLACEHOLDER: &str = "{question}";

pub const DEFAULT_TEMPLATE: &str = "주어진 질문에 짧고 간결하게 한글로 답변을 제공해주세요.\n\n\
     Question: {question}\n";

pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=2.0;

/// A prompt with a single `{question}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate(String);

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, ConfigError> {
        let template = template.into();
        if !template.contains(QUESTION_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder);
        }
        Ok(Self(template))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[allow(clippy::literal_string_with_formatting_args)]
    pub fn format(&self, question: &str) -> String {
        // {question} is a placeholder for string replacement, not a format argument
        self.0.replace(QUESTION_PLACEHOLDER, question)
    }
}

/// Everything the pipeline needs to turn a question into a model request.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptConfig {
    template: PromptTemplate,
    model_identifier: String,
    temperature: f32,
}

impl PromptConfig {
    pub fn new(template: &str, model_identifier: &str, temperature: f32) -> Result<Self, ConfigError> {
        let template = PromptTemplate::new(template)?;

        let model_identifier = model_identifier.trim();
        if model_identifier.is_empty() {
            return Err(ConfigError::EmptyModel);
        }

        if !temperature.is_finite() || !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(ConfigError::TemperatureOutOfRange(temperature));
        }

        Ok(Self {
            template,
            model_identifier: model_identifier.to_string(),
            temperature,
        })
    }

    pub const fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn model_identifier(&self) -> &str {
        &self.model_identifier
    }

    pub const fn temperature(&self) -> f32 {
        self.temperature
    }
}
