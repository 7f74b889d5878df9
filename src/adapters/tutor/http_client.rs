//! Tutor client that calls a remote `/socratic-tutor` endpoint.
//!
//! The remote side applies the fallback payloads for study material, so this
//! client only decodes `result` into the typed value for each action. A
//! result of the wrong shape is still handled with the same policy as
//! [`super::LlmTutorClient`].

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::domain::conversation::{extract_json_array, extract_json_block};
use crate::domain::session::Evaluation;
use crate::ports::{
    ChallengeQuiz, ContinueRequest, EvaluateRequest, Flashcard, TutorAction, TutorClient,
    TutorError,
};

use super::fallbacks::{
    fallback_flashcards, fallback_quiz, fallback_summary, fallback_topic, warn_fallback,
};
use super::llm_tutor_client::non_empty;
use super::wire::{TutorRequest, TutorResponse};

/// Retry delay assumed when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u32 = 30;

pub struct HttpTutorClient {
    client: Client,
    endpoint: String,
    api_key: Option<Secret<String>>,
}

impl HttpTutorClient {
    /// `endpoint` is the full URL of the tutor route.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TutorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TutorError::unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
        })
    }

    /// Sends the key as a bearer token on every call.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(key.into()));
        self
    }

    async fn call(&self, action: TutorAction, request: TutorRequest) -> Result<Value, TutorError> {
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TutorError::unavailable(e.to_string()))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

        let text = response
            .text()
            .await
            .map_err(|e| TutorError::unavailable(format!("unreadable tutor response: {}", e)))?;

        if status.is_success() {
            let body: TutorResponse = serde_json::from_str(&text)
                .map_err(|e| TutorError::unavailable(format!("unreadable tutor response: {}", e)))?;
            return body
                .result
                .ok_or_else(|| TutorError::malformed(action, "response has no result"));
        }

        // Error bodies may come from a proxy or a timeout layer and need not be JSON.
        let message = serde_json::from_str::<TutorResponse>(&text)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| status.to_string());

        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(TutorError::RateLimited {
                retry_after_secs: retry_after,
            }),
            StatusCode::UNAUTHORIZED => Err(TutorError::Authentication),
            StatusCode::BAD_REQUEST => Err(TutorError::InvalidRequest(message)),
            StatusCode::BAD_GATEWAY => Err(TutorError::malformed(action, message)),
            _ => Err(TutorError::Unavailable(message)),
        }
    }

    async fn call_text(
        &self,
        action: TutorAction,
        request: TutorRequest,
    ) -> Result<String, TutorError> {
        match self.call(action, request).await? {
            Value::String(text) => non_empty(action, text),
            other => Err(TutorError::malformed(action, format!("expected text, got {}", other))),
        }
    }
}

/// Decodes a structured result, accepting JSON embedded in a string.
fn decode<T: DeserializeOwned>(action: TutorAction, value: Value) -> Result<T, TutorError> {
    let parsed = match value {
        Value::String(text) => {
            let block = if matches!(action, TutorAction::GenerateFlashcards) {
                extract_json_array(&text)
            } else {
                extract_json_block(&text)
            };
            serde_json::from_str(block)
        }
        other => serde_json::from_value(other),
    };
    parsed.map_err(|e| TutorError::malformed(action, e.to_string()))
}

#[async_trait]
impl TutorClient for HttpTutorClient {
    async fn start(&self, topic: &str) -> Result<String, TutorError> {
        let action = TutorAction::Start;
        self.call_text(action, TutorRequest::new(action).with_topic(topic))
            .await
    }

    async fn continue_dialogue(&self, request: ContinueRequest) -> Result<String, TutorError> {
        let action = TutorAction::Continue;
        let wire = TutorRequest::new(action)
            .with_user_response(request.user_response)
            .with_history(request.history)
            .with_learner(request.level, request.timing);
        self.call_text(action, wire).await
    }

    async fn evaluate(&self, request: EvaluateRequest) -> Result<Evaluation, TutorError> {
        let action = TutorAction::Evaluate;
        let wire = TutorRequest::new(action)
            .with_topic(request.topic)
            .with_history(request.history)
            .with_learner(request.level, request.timing);
        let value = self.call(action, wire).await?;
        decode(action, value)
    }

    async fn extract_topic(&self, prompt: &str) -> Result<String, TutorError> {
        let action = TutorAction::ExtractTopic;
        let extracted = self
            .call_text(action, TutorRequest::new(action).with_prompt(prompt))
            .await;
        Ok(extracted.unwrap_or_else(|err| {
            warn_fallback(action, &err);
            fallback_topic(prompt)
        }))
    }

    async fn generate_summary(&self, topic: &str) -> Result<String, TutorError> {
        let action = TutorAction::GenerateSummary;
        match self
            .call_text(action, TutorRequest::new(action).with_topic(topic))
            .await
        {
            Ok(notes) => Ok(notes),
            Err(err @ TutorError::MalformedOutput { .. }) => {
                warn_fallback(action, &err);
                Ok(fallback_summary(topic))
            }
            Err(err) => Err(err),
        }
    }

    async fn generate_flashcards(
        &self,
        topic: &str,
        count: u32,
    ) -> Result<Vec<Flashcard>, TutorError> {
        let action = TutorAction::GenerateFlashcards;
        let wire = TutorRequest::new(action)
            .with_topic(topic)
            .with_number_of_cards(count);
        let value = self.call(action, wire).await?;
        let cards = decode::<Vec<Flashcard>>(action, value)
            .and_then(|cards| {
                if cards.is_empty() {
                    Err(TutorError::malformed(action, "no flashcards"))
                } else {
                    Ok(cards)
                }
            })
            .unwrap_or_else(|err| {
                warn_fallback(action, &err);
                fallback_flashcards(topic)
            });
        Ok(cards)
    }

    async fn generate_challenge_quiz(
        &self,
        topic: &str,
        count: u32,
    ) -> Result<ChallengeQuiz, TutorError> {
        let action = TutorAction::Challenge;
        // The endpoint reuses numberOfCards as the question count.
        let wire = TutorRequest::new(action)
            .with_topic(topic)
            .with_number_of_cards(count);
        let value = self.call(action, wire).await?;
        let quiz = decode::<ChallengeQuiz>(action, value)
            .and_then(|quiz| {
                if quiz.is_well_formed() {
                    Ok(quiz)
                } else {
                    Err(TutorError::malformed(action, "quiz is not well formed"))
                }
            })
            .unwrap_or_else(|err| {
                warn_fallback(action, &err);
                fallback_quiz(topic)
            });
        Ok(quiz)
    }
}
