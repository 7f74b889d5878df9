//! JSON wire format of the `/socratic-tutor` endpoint.
//!
//! Requests are a flat object keyed by `action`; optional fields are only
//! meaningful for the actions that use them. Responses carry either `result`
//! (a string or a JSON value, depending on the action) or `error`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::conversation::{LearnerLevel, ResponseTiming};
use crate::ports::{Message, TutorAction};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorRequest {
    /// Kept as text so unknown actions reach the handler and get a proper error.
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<Vec<Message>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_level: Option<LearnerLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_timing: Option<ResponseTiming>,
    /// Raw learner input for topic extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_cards: Option<u32>,
}

impl TutorRequest {
    pub fn new(action: TutorAction) -> Self {
        Self {
            action: action.as_str().to_string(),
            ..Default::default()
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_user_response(mut self, response: impl Into<String>) -> Self {
        self.user_response = Some(response.into());
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.conversation_history = Some(history);
        self
    }

    pub fn with_learner(
        mut self,
        level: Option<LearnerLevel>,
        timing: Option<ResponseTiming>,
    ) -> Self {
        self.user_level = level;
        self.response_timing = timing;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_number_of_cards(mut self, count: u32) -> Self {
        self.number_of_cards = Some(count);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TutorResponse {
    pub fn success(result: impl Into<Value>) -> Self {
        Self {
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }
}
