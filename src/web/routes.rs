use std::sync::Arc;

use axum::Json;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use super::AppState;
use super::page::render_page;
use crate::chat::{ChatTurn, MAX_QUESTION_BYTES, SessionEntry, SessionId, TurnStart};
use crate::pipeline::PipelineError;

pub const SESSION_COOKIE: &str = "gazzi_session";

const BUSY_NOTICE: &str = "이전 질문에 대한 답변을 기다리는 중입니다. 답변이 나온 뒤 다시 질문해 주세요.";
const TOO_LONG_NOTICE: &str = "질문이 너무 깁니다. 64KB 이하로 줄여 주세요.";

#[derive(Debug, Deserialize)]
pub struct QuestionForm {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse<'a> {
    pub messages: &'a [ChatTurn],
}

/// How a submitted question was taken up.
enum Submission {
    Ignored,
    Busy,
    TooLong,
    /// The model call runs on its own task and records its result when done.
    Running(JoinHandle<Result<String, PipelineError>>),
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let entry = open_session(&state, &headers).await;

    let html = {
        let mut session = entry.handle.lock().await;
        let notice = session.take_notice();
        let pending = session.is_processing();
        render_page(&state.page, session.replay(), pending, notice.as_deref())
    };

    with_session_cookie(Html(html).into_response(), &entry)
}

/// Logs the question and redirects right away; the answer shows up on a
/// later render.
pub async fn submit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<QuestionForm>,
) -> Response {
    let entry = open_session(&state, &headers).await;

    let notice = match start_turn(&entry, &form.question).await {
        Submission::Ignored | Submission::Running(_) => None,
        Submission::Busy => Some(BUSY_NOTICE),
        Submission::TooLong => Some(TOO_LONG_NOTICE),
    };
    if let Some(notice) = notice {
        entry.handle.lock().await.set_notice(notice);
    }

    with_session_cookie(Redirect::to("/").into_response(), &entry)
}

/// Lists the turns of an existing session. Never opens a session.
pub async fn list_messages(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let handle = match session_from_headers(&headers) {
        Some(id) => state.store.get(id).await,
        None => None,
    };

    match handle {
        Some(handle) => {
            let session = handle.lock().await;
            Json(MessagesResponse {
                messages: session.log().turns(),
            })
            .into_response()
        }
        None => Json(MessagesResponse { messages: &[] }).into_response(),
    }
}

/// Runs one turn and answers with the updated transcript.
pub async fn post_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<QuestionForm>,
) -> Response {
    let entry = open_session(&state, &headers).await;

    let response = match start_turn(&entry, &body.question).await {
        Submission::Ignored => StatusCode::NO_CONTENT.into_response(),
        Submission::Busy => error_response(
            StatusCode::CONFLICT,
            "a previous question is still being answered",
        ),
        Submission::TooLong => error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            &format!("question exceeds {MAX_QUESTION_BYTES} bytes"),
        ),
        Submission::Running(task) => match task.await {
            Ok(Ok(_)) => {
                let session = entry.handle.lock().await;
                Json(MessagesResponse {
                    messages: session.log().turns(),
                })
                .into_response()
            }
            Ok(Err(err)) => error_response(error_status(&err), &err.to_string()),
            Err(join_error) => {
                error!(session = %entry.id, error = %join_error, "chat turn task failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "chat turn failed")
            }
        },
    };

    with_session_cookie(response, &entry)
}

pub async fn health() -> &'static str {
    "ok"
}

/// Logs the question under the session lock, then runs the model call on a
/// separate task without holding the lock.
///
/// The task owns the rest of the turn, so the answer (or the retry notice)
/// is recorded even if the client goes away.
async fn start_turn(entry: &SessionEntry, raw: &str) -> Submission {
    if raw.len() > MAX_QUESTION_BYTES {
        return Submission::TooLong;
    }

    let start = entry.handle.lock().await.begin(raw);
    let pending = match start {
        TurnStart::Ignored => return Submission::Ignored,
        TurnStart::Busy => return Submission::Busy,
        TurnStart::Started(pending) => pending,
    };

    let handle = Arc::clone(&entry.handle);
    let id = entry.id;
    Submission::Running(tokio::spawn(async move {
        let result = pending.run().await;

        let mut session = handle.lock().await;
        let result = session.finish(result);
        if let Err(err) = &result {
            warn!(session = %id, error = %err, "chat turn failed");
            session.set_notice(err.user_message());
        }
        result
    }))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

const fn error_status(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        PipelineError::ModelUnavailable { .. } | PipelineError::ModelResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

async fn open_session(state: &AppState, headers: &HeaderMap) -> SessionEntry {
    state
        .store
        .get_or_create(session_from_headers(headers))
        .await
}

fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.parse().ok())
}

fn with_session_cookie(mut response: Response, entry: &SessionEntry) -> Response {
    if entry.created {
        let cookie = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            entry.id
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_headers_finds_cookie() {
        let id = SessionId::new();
        let mut headers = HeaderMap::new();
        let cookie = format!("theme=dark; {SESSION_COOKIE}={id}; other=1");
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&cookie).unwrap_or(HeaderValue::from_static("")),
        );

        assert_eq!(session_from_headers(&headers), Some(id));
    }

    #[test]
    fn test_session_from_headers_ignores_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("gazzi_session=not-a-uuid"),
        );
        assert_eq!(session_from_headers(&headers), None);
        assert_eq!(session_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_error_status() {
        assert_eq!(
            error_status(&PipelineError::Timeout(std::time::Duration::from_secs(1))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            error_status(&PipelineError::ModelResponse("bad".to_string())),
            StatusCode::BAD_GATEWAY
        );
    }
}
