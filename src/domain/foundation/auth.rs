//! Authentication types for the domain layer.
//!
//! The auth provider itself is external. These types carry only what the
//! dialogue engine needs: who the current learner is, or that nobody is
//! signed in.

use super::UserId;
use thiserror::Error;

/// The signed-in learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique user identifier from the auth provider.
    pub id: UserId,

    /// Display name if the provider supplies one.
    pub display_name: Option<String>,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(id: UserId, display_name: Option<String>) -> Self {
        Self { id, display_name }
    }

    /// Returns the display name, or the user id as fallback.
    pub fn display_name_or_id(&self) -> &str {
        self.display_name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Authentication errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No learner is signed in.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The auth provider could not be reached.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_id() {
        let user = AuthenticatedUser::new(UserId::new("user-123").unwrap(), None);
        assert_eq!(user.display_name_or_id(), "user-123");

        let named = AuthenticatedUser::new(
            UserId::new("user-123").unwrap(),
            Some("Ada".to_string()),
        );
        assert_eq!(named.display_name_or_id(), "Ada");
    }

    #[test]
    fn only_service_errors_are_transient() {
        assert!(AuthError::ServiceUnavailable("timeout".into()).is_transient());
        assert!(!AuthError::NotAuthenticated.is_transient());
    }
}
