use std::sync::Arc;

use tracing::debug;

use super::input::{Input, parse_input};
use super::turn::{ChatTurn, SessionLog};
use crate::pipeline::{PipelineError, ResponderPipeline};

/// Where a session is in its input/answer cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingInput,
    Processing,
}

/// Result of submitting one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing was recorded and the model was not called.
    Ignored,
    /// A previous question is still waiting for its answer.
    Busy,
    Answered(String),
}

/// What [`ChatSession::begin`] decided about one line of input.
pub enum TurnStart {
    Ignored,
    Busy,
    /// The question is logged; run it and hand the result to `finish`.
    Started(PendingTurn),
}

/// A question that has been logged but not yet answered.
///
/// Owns what the model call needs, so the session lock can be released
/// while the model is working.
pub struct PendingTurn {
    question: String,
    pipeline: Arc<ResponderPipeline>,
}

impl PendingTurn {
    pub fn question(&self) -> &str {
        &self.question
    }

    pub async fn run(self) -> Result<String, PipelineError> {
        self.pipeline.invoke(&self.question).await
    }
}

/// One isolated conversation.
///
/// The session owns its [`SessionLog`] exclusively; turns are only ever
/// appended, in the order they happened. At most one question is in flight,
/// so every user turn is followed by its own answer (or by nothing, if the
/// call failed).
pub struct ChatSession {
    log: SessionLog,
    state: SessionState,
    notice: Option<String>,
    pipeline: Arc<ResponderPipeline>,
}

impl ChatSession {
    pub fn new(log: SessionLog, pipeline: Arc<ResponderPipeline>) -> Self {
        Self {
            log,
            state: SessionState::Idle,
            notice: None,
            pipeline,
        }
    }

    pub const fn log(&self) -> &SessionLog {
        &self.log
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn is_processing(&self) -> bool {
        matches!(self.state, SessionState::Processing)
    }

    /// Returns the turns to draw, in order, and starts waiting for input.
    pub fn replay(&mut self) -> &[ChatTurn] {
        if self.state == SessionState::Idle {
            self.state = SessionState::AwaitingInput;
        }
        self.log.turns()
    }

    /// Records the question and moves to `Processing`.
    ///
    /// The model is not called here; run the returned [`PendingTurn`] and
    /// pass its result to [`finish`](Self::finish).
    pub fn begin(&mut self, raw: &str) -> TurnStart {
        if self.is_processing() {
            return TurnStart::Busy;
        }
        let Input::Text(question) = parse_input(raw) else {
            return TurnStart::Ignored;
        };

        self.log.push(ChatTurn::user(question.as_str()));
        self.state = SessionState::Processing;

        TurnStart::Started(PendingTurn {
            question,
            pipeline: Arc::clone(&self.pipeline),
        })
    }

    /// Records the answer of the in-flight question and returns to `Idle`.
    ///
    /// On failure the question stays in the log without an answer and the
    /// error is handed back to the caller.
    pub fn finish(
        &mut self,
        result: Result<String, PipelineError>,
    ) -> Result<String, PipelineError> {
        self.state = SessionState::Idle;

        let answer = result?;
        self.log.push(ChatTurn::assistant(answer.as_str()));
        debug!(turns = self.log.len(), "turn completed");

        Ok(answer)
    }

    /// Runs one whole turn while holding the session.
    pub async fn submit(&mut self, raw: &str) -> Result<TurnOutcome, PipelineError> {
        let pending = match self.begin(raw) {
            TurnStart::Ignored => return Ok(TurnOutcome::Ignored),
            TurnStart::Busy => return Ok(TurnOutcome::Busy),
            TurnStart::Started(pending) => pending,
        };

        let result = pending.run().await;
        self.finish(result).map(TurnOutcome::Answered)
    }

    /// Stores a message to show once on the next render.
    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    pub const fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::chat::Role;
    use crate::pipeline::PromptConfig;
    use crate::pipeline::testing::StubBackend;

    fn session_with(backend: Arc<StubBackend>) -> ChatSession {
        let prompt = PromptConfig::new("Question: {question}", "gemma2:2b", 0.7).unwrap();
        let pipeline = Arc::new(ResponderPipeline::new(prompt, backend));
        ChatSession::new(SessionLog::new(), pipeline)
    }

    #[tokio::test]
    async fn test_scenario_capital_of_korea() {
        let mut session = session_with(StubBackend::answering("서울입니다."));

        let outcome = session.submit("대한민국의 수도는?").await.unwrap();

        assert_eq!(outcome, TurnOutcome::Answered("서울입니다.".to_string()));
        assert_eq!(
            session.log().turns(),
            [
                ChatTurn::user("대한민국의 수도는?"),
                ChatTurn::assistant("서울입니다."),
            ]
        );
    }

    #[tokio::test]
    async fn test_n_turns_alternate_starting_with_user() {
        let mut session = session_with(StubBackend::echo());

        for i in 0..5 {
            session.submit(&format!("question {i}")).await.unwrap();
        }

        let turns = session.log().turns();
        assert_eq!(turns.len(), 10);
        for (i, turn) in turns.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(turn.role(), expected);
        }
        assert_eq!(turns[8].content(), "question 4");
        assert_eq!(turns[9].content(), "Question: question 4");
    }

    #[tokio::test]
    async fn test_empty_input_is_ignored() {
        let backend = StubBackend::answering("unused");
        let mut session = session_with(backend.clone());

        for raw in ["", "   ", "\n\t"] {
            assert_eq!(session.submit(raw).await.unwrap(), TurnOutcome::Ignored);
        }

        assert!(session.log().is_empty());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_backend_keeps_user_turn_only() {
        let mut session = session_with(StubBackend::unavailable());

        let err = session.submit("hello").await.unwrap_err();

        assert!(matches!(err, PipelineError::ModelUnavailable { .. }));
        assert_eq!(session.log().turns(), [ChatTurn::user("hello")]);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_malformed_response_is_reported() {
        let mut session = session_with(StubBackend::malformed());

        let err = session.submit("hello").await.unwrap_err();

        assert!(matches!(err, PipelineError::ModelResponse(_)));
        assert_eq!(session.log().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_after_failure_appends_new_pair() {
        let backend = StubBackend::unavailable();
        let mut session = session_with(backend);
        let _ = session.submit("first").await;

        // Same log, now served by a healthy backend.
        let log = session.log().clone();
        let prompt = PromptConfig::new("{question}", "gemma2:2b", 0.7).unwrap();
        let pipeline = Arc::new(ResponderPipeline::new(prompt, StubBackend::answering("ok")));
        let mut session = ChatSession::new(log, pipeline);

        session.submit("second").await.unwrap();

        let contents: Vec<_> = session.log().turns().iter().map(ChatTurn::content).collect();
        assert_eq!(contents, ["first", "second", "ok"]);
    }

    #[tokio::test]
    async fn test_state_cycle() {
        let mut session = session_with(StubBackend::answering("ok"));
        assert_eq!(session.state(), SessionState::Idle);

        session.replay();
        assert_eq!(session.state(), SessionState::AwaitingInput);

        session.submit("hi").await.unwrap();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_notice_is_shown_once() {
        let mut session = session_with(StubBackend::answering("ok"));
        session.set_notice("try again");

        assert_eq!(session.take_notice(), Some("try again".to_string()));
        assert_eq!(session.take_notice(), None);
    }

    #[tokio::test]
    async fn test_begin_logs_question_before_the_model_runs() {
        let backend = StubBackend::answering("서울입니다.");
        let mut session = session_with(backend.clone());

        let TurnStart::Started(pending) = session.begin("  대한민국의 수도는? ") else {
            panic!("expected a started turn");
        };

        assert_eq!(pending.question(), "대한민국의 수도는?");
        assert_eq!(session.log().turns(), [ChatTurn::user("대한민국의 수도는?")]);
        assert!(session.is_processing());
        assert_eq!(backend.call_count(), 0);

        let result = pending.run().await;
        assert_eq!(session.finish(result).unwrap(), "서울입니다.");
        assert_eq!(session.log().len(), 2);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_second_question_while_processing_is_busy() {
        let mut session = session_with(StubBackend::answering("ok"));

        let first = session.begin("first");
        assert!(matches!(first, TurnStart::Started(_)));
        assert!(matches!(session.begin("second"), TurnStart::Busy));

        assert_eq!(session.log().turns(), [ChatTurn::user("first")]);
    }

    #[test]
    fn test_failed_finish_returns_to_idle() {
        let mut session = session_with(StubBackend::answering("ok"));
        let _pending = session.begin("hello");

        let err = session
            .finish(Err(PipelineError::ModelResponse("bad".to_string())))
            .unwrap_err();

        assert!(matches!(err, PipelineError::ModelResponse(_)));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.log().turns(), [ChatTurn::user("hello")]);
        assert!(matches!(session.begin("again"), TurnStart::Started(_)));
    }
}
