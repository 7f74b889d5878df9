//! GetSessionHandler - Query handler for retrieving one of the learner's sessions.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::session::{LearningSession, SessionError};
use crate::ports::{IdentityProvider, SessionRepository};

/// Query to get a session by ID.
#[derive(Debug, Clone)]
pub struct GetSessionQuery {
    pub session_id: SessionId,
}

/// Handler for retrieving session details.
pub struct GetSessionHandler {
    identity: Arc<dyn IdentityProvider>,
    repository: Arc<dyn SessionRepository>,
}

impl GetSessionHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>, repository: Arc<dyn SessionRepository>) -> Self {
        Self {
            identity,
            repository,
        }
    }

    pub async fn handle(&self, query: GetSessionQuery) -> Result<LearningSession, SessionError> {
        owned_session(self.identity.as_ref(), self.repository.as_ref(), query.session_id).await
    }
}

/// Loads a session and checks the signed-in learner owns it.
pub(super) async fn owned_session(
    identity: &dyn IdentityProvider,
    repository: &dyn SessionRepository,
    session_id: SessionId,
) -> Result<LearningSession, SessionError> {
    let user = identity.require_user().await?;

    let session = repository
        .find_by_id(&session_id)
        .await?
        .ok_or_else(|| SessionError::not_found(session_id))?;

    // Authorization check - ensure user owns the session
    session.authorize(&user.id)?;

    Ok(session)
}
