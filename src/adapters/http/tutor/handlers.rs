//! HTTP handlers for the tutor endpoint.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

use crate::adapters::tutor::{TutorRequest, TutorResponse};
use crate::config::TutorConfig;
use crate::ports::{ContinueRequest, EvaluateRequest, TutorAction, TutorClient, TutorError};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the tutor routes.
#[derive(Clone)]
pub struct TutorAppState {
    pub tutor: Arc<dyn TutorClient>,
    pub defaults: TutorConfig,
}

impl TutorAppState {
    pub fn new(tutor: Arc<dyn TutorClient>, defaults: TutorConfig) -> Self {
        Self { tutor, defaults }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// `POST /socratic-tutor`
pub async fn socratic_tutor(
    State(state): State<TutorAppState>,
    payload: Result<Json<TutorRequest>, JsonRejection>,
) -> Result<Json<TutorResponse>, TutorApiError> {
    let Json(request) =
        payload.map_err(|e| TutorApiError(TutorError::invalid_request(e.body_text())))?;
    let action = request.action.clone();

    match dispatch(state.tutor.as_ref(), &state.defaults, request).await {
        Ok(result) => Ok(Json(TutorResponse::success(result))),
        Err(err) => {
            tracing::error!(action = %action, error = %err, "tutor request failed");
            Err(TutorApiError(err))
        }
    }
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn required(value: Option<String>, message: &str) -> Result<String, TutorError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| TutorError::invalid_request(message))
}

fn to_value<T: serde::Serialize>(action: TutorAction, payload: &T) -> Result<Value, TutorError> {
    serde_json::to_value(payload).map_err(|e| TutorError::malformed(action, e.to_string()))
}

/// Runs one wire request against the tutor client.
pub async fn dispatch(
    tutor: &dyn TutorClient,
    defaults: &TutorConfig,
    request: TutorRequest,
) -> Result<Value, TutorError> {
    let action: TutorAction = request.action.parse()?;

    match action {
        TutorAction::Start => {
            let topic = required(request.topic, "Missing topic")?;
            Ok(Value::String(tutor.start(&topic).await?))
        }
        TutorAction::Continue => {
            let (Some(history), Some(user_response)) =
                (request.conversation_history, request.user_response)
            else {
                return Err(TutorError::invalid_request(
                    "Missing conversation history or user response",
                ));
            };
            let reply = tutor
                .continue_dialogue(ContinueRequest {
                    user_response,
                    history,
                    level: request.user_level,
                    timing: request.response_timing,
                })
                .await?;
            Ok(Value::String(reply))
        }
        TutorAction::Evaluate => {
            let (Some(history), Some(topic)) = (request.conversation_history, request.topic) else {
                return Err(TutorError::invalid_request(
                    "Missing conversation history or topic",
                ));
            };
            let evaluation = tutor
                .evaluate(EvaluateRequest {
                    topic,
                    history,
                    level: request.user_level,
                    timing: request.response_timing,
                })
                .await?;
            to_value(action, &evaluation)
        }
        TutorAction::Challenge => {
            let topic = required(request.topic, "Missing topic for challenge")?;
            let count = request
                .number_of_cards
                .unwrap_or(defaults.quiz_question_count);
            let quiz = tutor.generate_challenge_quiz(&topic, count).await?;
            to_value(action, &quiz)
        }
        TutorAction::ExtractTopic => {
            let prompt = request.prompt.unwrap_or_default();
            Ok(Value::String(tutor.extract_topic(&prompt).await?))
        }
        TutorAction::GenerateFlashcards => {
            let topic = required(request.topic, "Missing topic for flashcards")?;
            let count = request.number_of_cards.unwrap_or(defaults.flashcard_count);
            let cards = tutor.generate_flashcards(&topic, count).await?;
            to_value(action, &cards)
        }
        TutorAction::GenerateSummary => {
            let topic = required(request.topic, "Missing topic for summary")?;
            Ok(Value::String(tutor.generate_summary(&topic).await?))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts tutor errors to HTTP responses.
#[derive(Debug)]
pub struct TutorApiError(pub TutorError);

impl From<TutorError> for TutorApiError {
    fn from(err: TutorError) -> Self {
        Self(err)
    }
}

impl IntoResponse for TutorApiError {
    fn into_response(self) -> Response {
        match self.0 {
            TutorError::RateLimited { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(TutorResponse::failure(
                    "OpenAI rate limit reached. Please try again in a few moments.",
                )),
            )
                .into_response(),
            TutorError::Authentication => (
                StatusCode::UNAUTHORIZED,
                Json(TutorResponse::failure(
                    "API key configuration issue. Please check server configuration.",
                )),
            )
                .into_response(),
            TutorError::InvalidRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(TutorResponse::failure(message))).into_response()
            }
            err @ TutorError::MalformedOutput { .. } => (
                StatusCode::BAD_GATEWAY,
                Json(TutorResponse::failure(err.to_string())),
            )
                .into_response(),
            TutorError::Unavailable(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TutorResponse::failure(message)),
            )
                .into_response(),
        }
    }
}
