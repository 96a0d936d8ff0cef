//! Scriptable backends for exercising the pipeline and chat sessions.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::client::{CompletionRequest, ModelBackend};
use super::error::PipelineError;

#[derive(Debug, Clone)]
enum Reply {
    Answer(String),
    Echo,
    Unavailable,
    Malformed,
    Hang,
}

pub struct StubBackend {
    reply: Reply,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StubBackend {
    fn with_reply(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn answering(answer: &str) -> Arc<Self> {
        Self::with_reply(Reply::Answer(answer.to_string()))
    }

    /// Answers with the prompt it received.
    pub fn echo() -> Arc<Self> {
        Self::with_reply(Reply::Echo)
    }

    pub fn unavailable() -> Arc<Self> {
        Self::with_reply(Reply::Unavailable)
    }

    pub fn malformed() -> Arc<Self> {
        Self::with_reply(Reply::Malformed)
    }

    pub fn hanging() -> Arc<Self> {
        Self::with_reply(Reply::Hang)
    }

    #[allow(clippy::unwrap_used)]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests().len()
    }
}

#[async_trait]
impl ModelBackend for StubBackend {
    #[allow(clippy::unwrap_used)]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, PipelineError> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.reply {
            Reply::Answer(answer) => Ok(answer.clone()),
            Reply::Echo => Ok(request.prompt.clone()),
            Reply::Unavailable => Err(PipelineError::ModelUnavailable {
                endpoint: self.endpoint().to_string(),
                source: "connection refused".into(),
            }),
            Reply::Malformed => Err(PipelineError::ModelResponse(
                "malformed response body".to_string(),
            )),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
        }
    }

    fn endpoint(&self) -> &str {
        "stub://backend"
    }
}
