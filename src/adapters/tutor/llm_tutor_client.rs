//! Tutor client backed directly by an [`AIProvider`].
//!
//! Prompts live in [`super::prompts`]. Replies for the dialogue actions are
//! checked and surfaced as [`TutorError::MalformedOutput`] when unusable; the
//! auxiliary generators substitute the canned payloads below instead.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::domain::conversation::{extract_json_array, extract_json_block};
use crate::domain::session::Evaluation;
use crate::ports::{
    AIProvider, ChallengeQuiz, CompletionRequest, ContinueRequest, EvaluateRequest, Flashcard,
    Message, RequestMetadata, TutorAction, TutorClient, TutorError,
};

use super::fallbacks::{
    fallback_flashcards, fallback_quiz, fallback_summary, fallback_topic, warn_fallback,
};
use super::prompts;

/// Sampling temperature used for every action.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub struct LlmTutorClient {
    provider: Arc<dyn AIProvider>,
    temperature: f32,
}

impl LlmTutorClient {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    async fn complete(
        &self,
        action: TutorAction,
        messages: Vec<Message>,
    ) -> Result<String, TutorError> {
        let request = CompletionRequest::new(RequestMetadata::new(action.as_str()))
            .with_messages(messages)
            .with_temperature(self.temperature);

        let response = self.provider.complete(request).await?;
        tracing::debug!(
            action = %action,
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "tutor completion received"
        );
        Ok(response.content)
    }

    /// Parses the first JSON payload found in `raw`.
    fn parse_payload<T: DeserializeOwned>(
        action: TutorAction,
        raw: &str,
        prefer_array: bool,
    ) -> Result<T, TutorError> {
        let block = if prefer_array {
            extract_json_array(raw)
        } else {
            extract_json_block(raw)
        };
        serde_json::from_str(block).map_err(|e| TutorError::malformed(action, e.to_string()))
    }
}

/// Trimmed reply text; blank replies are malformed.
pub(super) fn non_empty(action: TutorAction, text: String) -> Result<String, TutorError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TutorError::malformed(action, "empty reply"));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl TutorClient for LlmTutorClient {
    async fn start(&self, topic: &str) -> Result<String, TutorError> {
        let action = TutorAction::Start;
        let raw = self.complete(action, prompts::start(topic)).await?;
        non_empty(action, raw)
    }

    async fn continue_dialogue(&self, request: ContinueRequest) -> Result<String, TutorError> {
        let action = TutorAction::Continue;
        if request.user_response.trim().is_empty() {
            return Err(TutorError::invalid_request("Missing conversation history or user response"));
        }
        let messages = prompts::continuation(
            &request.history,
            &request.user_response,
            request.level,
            request.timing,
        );
        let raw = self.complete(action, messages).await?;
        non_empty(action, raw)
    }

    async fn evaluate(&self, request: EvaluateRequest) -> Result<Evaluation, TutorError> {
        let action = TutorAction::Evaluate;
        if request.topic.trim().is_empty() {
            return Err(TutorError::invalid_request("Missing conversation history or topic"));
        }
        let raw = self
            .complete(action, prompts::evaluation(&request.topic, &request.history))
            .await?;
        Self::parse_payload(action, &raw, false)
    }

    async fn extract_topic(&self, prompt: &str) -> Result<String, TutorError> {
        let action = TutorAction::ExtractTopic;
        let extracted = match self.complete(action, prompts::extract_topic(prompt)).await {
            Ok(raw) => non_empty(action, raw),
            Err(err) => Err(err),
        };
        // Session creation depends on a label, so provider failures fall back too.
        Ok(extracted.unwrap_or_else(|err| {
            warn_fallback(action, &err);
            fallback_topic(prompt)
        }))
    }

    async fn generate_summary(&self, topic: &str) -> Result<String, TutorError> {
        let action = TutorAction::GenerateSummary;
        let raw = self.complete(action, prompts::summary(topic)).await?;
        Ok(non_empty(action, raw).unwrap_or_else(|err| {
            warn_fallback(action, &err);
            fallback_summary(topic)
        }))
    }

    async fn generate_flashcards(
        &self,
        topic: &str,
        count: u32,
    ) -> Result<Vec<Flashcard>, TutorError> {
        let action = TutorAction::GenerateFlashcards;
        let raw = self.complete(action, prompts::flashcards(topic, count)).await?;
        let parsed = Self::parse_payload::<Vec<Flashcard>>(action, &raw, true).and_then(|cards| {
            if cards.is_empty() {
                Err(TutorError::malformed(action, "no flashcards"))
            } else {
                Ok(cards)
            }
        });
        Ok(parsed.unwrap_or_else(|err| {
            warn_fallback(action, &err);
            fallback_flashcards(topic)
        }))
    }

    async fn generate_challenge_quiz(
        &self,
        topic: &str,
        count: u32,
    ) -> Result<ChallengeQuiz, TutorError> {
        let action = TutorAction::Challenge;
        let raw = self.complete(action, prompts::challenge(topic, count)).await?;
        let parsed = Self::parse_payload::<ChallengeQuiz>(action, &raw, false).and_then(|quiz| {
            if quiz.is_well_formed() {
                Ok(quiz)
            } else {
                Err(TutorError::malformed(action, "quiz questions need four options and a valid answer"))
            }
        });
        Ok(parsed.unwrap_or_else(|err| {
            warn_fallback(action, &err);
            fallback_quiz(topic)
        }))
    }
}
