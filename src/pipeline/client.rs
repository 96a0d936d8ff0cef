use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// A fully formatted request for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
}

/// Anything that can turn a prompt into a completion.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, PipelineError>;

    /// Where requests go, for logging.
    fn endpoint(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Backend speaking the OpenAI-compatible chat completions API.
///
/// Ollama serves this API under `/v1`, so a local Ollama endpoint works as-is.
pub struct OpenAiCompatBackend {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl OpenAiCompatBackend {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.endpoint.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ModelBackend for OpenAiCompatBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, PipelineError> {
        let url = self.completions_url();

        let chat_request = ChatCompletionRequest {
            model: &request.model,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            stream: false,
        };

        let mut http_request = self.client.post(&url).json(&chat_request);

        // Add Authorization header if API key is present
        if let Some(api_key) = &self.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| PipelineError::ModelUnavailable {
                endpoint: url.clone(),
                source: Box::new(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::ModelResponse(format!(
                "request failed with status {status}: {body}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::ModelResponse(format!("failed to read body: {e}")))?;

        parse_completion(&body)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Extracts the plain-text answer from a chat completion envelope.
fn parse_completion(body: &str) -> Result<String, PipelineError> {
    let envelope: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| PipelineError::ModelResponse(format!("malformed response body: {e}")))?;

    let content = envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::ModelResponse("response contained no choices".to_string()))?
        .message
        .content
        .unwrap_or_default();

    let content = content.trim();
    if content.is_empty() {
        return Err(PipelineError::ModelResponse(
            "response contained an empty completion".to_string(),
        ));
    }

    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion_with_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"서울입니다."}}]}"#;
        assert_eq!(parse_completion(body).ok(), Some("서울입니다.".to_string()));
    }

    #[test]
    fn test_parse_completion_trims_whitespace() {
        let body = r#"{"choices":[{"message":{"content":"\n  Seoul.  \n"}}]}"#;
        assert_eq!(parse_completion(body).ok(), Some("Seoul.".to_string()));
    }

    #[test]
    fn test_parse_completion_uses_first_choice() {
        let body = r#"{"choices":[{"message":{"content":"first"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(parse_completion(body).ok(), Some("first".to_string()));
    }

    #[test]
    fn test_parse_completion_empty_content() {
        let body = r#"{"choices":[{"message":{"content":"   "}}]}"#;
        assert!(matches!(
            parse_completion(body),
            Err(PipelineError::ModelResponse(_))
        ));
    }

    #[test]
    fn test_parse_completion_null_content() {
        let body = r#"{"choices":[{"message":{"content":null}}]}"#;
        assert!(matches!(
            parse_completion(body),
            Err(PipelineError::ModelResponse(_))
        ));
    }

    #[test]
    fn test_parse_completion_no_choices() {
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(PipelineError::ModelResponse(_))
        ));
        assert!(matches!(
            parse_completion("{}"),
            Err(PipelineError::ModelResponse(_))
        ));
    }

    #[test]
    fn test_parse_completion_malformed_json() {
        assert!(matches!(
            parse_completion("not json"),
            Err(PipelineError::ModelResponse(_))
        ));
    }

    #[test]
    fn test_completions_url_strips_trailing_slash() {
        let backend = OpenAiCompatBackend::new("http://localhost:11434/".to_string(), None);
        assert_eq!(
            backend.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: "gemma2:2b",
            messages: [Message {
                role: "user",
                content: "Question: hello",
            }],
            temperature: 0.5,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap_or_default();
        assert_eq!(json["model"], "gemma2:2b");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Question: hello");
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["stream"], false);
    }
}
