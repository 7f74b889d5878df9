//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the Socratix domain.

mod auth;
mod confidence_score;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use confidence_score::ConfidenceScore;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{SessionId, TurnId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
