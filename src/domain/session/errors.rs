//! Session-specific error types.

use crate::domain::foundation::{AuthError, DomainError, ErrorCode, SessionId};

/// Session-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No learner is signed in.
    NotAuthenticated,
    /// Session was not found.
    NotFound(SessionId),
    /// User is not the session owner.
    Forbidden,
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Storage or network failure.
    Infrastructure(String),
}

impl SessionError {
    pub fn not_found(id: SessionId) -> Self {
        SessionError::NotFound(id)
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        SessionError::Infrastructure(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotAuthenticated => ErrorCode::Unauthorized,
            SessionError::NotFound(_) => ErrorCode::SessionNotFound,
            SessionError::Forbidden => ErrorCode::Forbidden,
            SessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SessionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
    pub fn message(&self) -> String {
        match self {
            SessionError::NotAuthenticated => "Not authenticated".to_string(),
            SessionError::NotFound(id) => format!("Session not found: {}", id),
            SessionError::Forbidden => "Permission denied".to_string(),
            SessionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SessionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SessionError {}

impl From<DomainError> for SessionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden => SessionError::Forbidden,
            ErrorCode::Unauthorized => SessionError::NotAuthenticated,
            ErrorCode::ValidationFailed | ErrorCode::EmptyField => SessionError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            _ => SessionError::Infrastructure(err.message),
        }
    }
}

impl From<AuthError> for SessionError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotAuthenticated => SessionError::NotAuthenticated,
            AuthError::ServiceUnavailable(msg) => SessionError::Infrastructure(msg),
        }
    }
}
