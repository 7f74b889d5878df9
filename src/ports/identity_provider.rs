//! Identity provider port.
//!
//! Yields the learner on whose behalf session writes happen. Sessions, turns
//! and rewards are all scoped to this identity.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Resolves the current learner.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in learner, or `None` when nobody is signed in.
    ///
    /// # Errors
    ///
    /// - `ServiceUnavailable` if the identity backend cannot be reached
    async fn current_user(&self) -> Result<Option<AuthenticatedUser>, AuthError>;

    /// Like [`current_user`](Self::current_user) but treats a missing
    /// identity as `NotAuthenticated`.
    async fn require_user(&self) -> Result<AuthenticatedUser, AuthError> {
        self.current_user().await?.ok_or(AuthError::NotAuthenticated)
    }
}
