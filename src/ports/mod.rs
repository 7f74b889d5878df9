//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `SessionRepository` - Learning session persistence
//! - `MessageStore` - Append-only dialogue turn log
//! - `KeyValueStore` - JSON side-state for rewards
//! - `RewardLedger` - Badges, achievements, points, topic progress
//!
//! ## Generation Ports
//!
//! - `AIProvider` - Chat completion backend
//! - `TutorClient` - Socratic questions, evaluations and study material
//!
//! ## Identity
//!
//! - `IdentityProvider` - The signed-in learner

mod ai_provider;
mod identity_provider;
mod key_value_store;
mod message_store;
mod reward_ledger;
mod session_repository;
mod tutor_client;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, RequestMetadata, TokenUsage,
};
pub use identity_provider::IdentityProvider;
pub use key_value_store::{KeyValueError, KeyValueStore};
pub use message_store::{MessageStore, StoreError};
pub use reward_ledger::{RewardError, RewardLedger};
pub use session_repository::SessionRepository;
pub use tutor_client::{
    ChallengeQuiz, ContinueRequest, EvaluateRequest, Flashcard, QuizQuestion, TutorAction,
    TutorClient, TutorError, QUIZ_OPTION_COUNT,
};
