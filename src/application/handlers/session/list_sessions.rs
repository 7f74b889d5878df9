//! ListSessionsHandler - Query handler for the learner's session history.

use std::sync::Arc;

use crate::domain::session::{LearningSession, SessionError};
use crate::ports::{IdentityProvider, SessionRepository};

/// Handler for listing the signed-in learner's sessions, newest first.
pub struct ListSessionsHandler {
    identity: Arc<dyn IdentityProvider>,
    repository: Arc<dyn SessionRepository>,
}

impl ListSessionsHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>, repository: Arc<dyn SessionRepository>) -> Self {
        Self {
            identity,
            repository,
        }
    }

    pub async fn handle(&self) -> Result<Vec<LearningSession>, SessionError> {
        let user = self.identity.require_user().await?;
        let mut sessions = self.repository.find_by_user_id(&user.id).await?;
        sessions.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        Ok(sessions)
    }
}
