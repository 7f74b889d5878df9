//! Identity provider with a switchable signed-in learner.
//!
//! Used by tests and by single-user deployments where the learner is fixed
//! at startup.
//!
//! # Example
//!
//! ```ignore
//! use socratix::adapters::auth::StaticIdentityProvider;
//!
//! let identity = StaticIdentityProvider::signed_in("learner-1")?;
//! identity.sign_out();
//! assert!(identity.current_user().await?.is_none());
//! ```

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId, ValidationError};
use crate::ports::IdentityProvider;

#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
    user: RwLock<Option<AuthenticatedUser>>,
    /// Error returned for every lookup, for exercising failure paths.
    force_error: RwLock<Option<AuthError>>,
}

impl StaticIdentityProvider {
    /// Nobody signed in.
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: impl Into<String>) -> Result<Self, ValidationError> {
        let provider = Self::default();
        provider.sign_in(AuthenticatedUser::new(UserId::new(user_id)?, None));
        Ok(provider)
    }

    pub fn with_error(self, error: AuthError) -> Self {
        *self
            .force_error
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(error);
        self
    }

    pub fn sign_in(&self, user: AuthenticatedUser) {
        *self.user.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(user);
    }

    pub fn sign_out(&self) {
        *self.user.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_user(&self) -> Result<Option<AuthenticatedUser>, AuthError> {
        if let Some(err) = self
            .force_error
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
        {
            return Err(err);
        }
        Ok(self
            .user
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }
}
