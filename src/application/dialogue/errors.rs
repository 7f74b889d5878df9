//! Dialogue controller errors.

use thiserror::Error;

use crate::domain::conversation::DialogueState;
use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::session::SessionError;
use crate::ports::{StoreError, TutorError};

/// Errors returned by the dialogue controller.
#[derive(Debug, Error)]
pub enum DialogueError {
    /// The submitted answer was blank after trimming.
    #[error("Answer cannot be empty")]
    EmptyAnswer,

    /// The session has not been opened on this controller.
    #[error("Session {0} is not open")]
    NotOpen(SessionId),

    /// A start or submit for the session is still awaiting the tutor.
    #[error("Session {0} is still waiting for the tutor")]
    InFlight(SessionId),

    /// The operation is not valid in the dialogue's current state.
    #[error("Cannot {action} while the dialogue is {state:?}")]
    InvalidState {
        action: &'static str,
        state: DialogueState,
    },

    /// Loading, authorizing or updating the session failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A turn could not be stored or loaded.
    #[error("Turn storage failed: {0}")]
    Storage(#[from] StoreError),

    /// The tutor could not produce the next step.
    #[error("Tutor request failed: {0}")]
    Tutor(#[from] TutorError),
}

impl From<DomainError> for DialogueError {
    fn from(err: DomainError) -> Self {
        DialogueError::Session(err.into())
    }
}

impl DialogueError {
    /// Returns true if the same call may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            DialogueError::InFlight(_) | DialogueError::Storage(_) => true,
            DialogueError::Tutor(err) => err.is_transient(),
            DialogueError::Session(SessionError::Infrastructure(_)) => true,
            _ => false,
        }
    }
}
