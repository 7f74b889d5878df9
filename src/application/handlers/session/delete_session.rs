//! DeleteSessionHandler - Command handler for removing a session and its transcript.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::session::SessionError;
use crate::ports::{IdentityProvider, MessageStore, SessionRepository};

use super::get_session::owned_session;

/// Command to delete a session.
#[derive(Debug, Clone)]
pub struct DeleteSessionCommand {
    pub session_id: SessionId,
}

/// Handler for deleting sessions. Turns are removed before the session so a
/// failure never leaves turns without their session.
pub struct DeleteSessionHandler {
    identity: Arc<dyn IdentityProvider>,
    repository: Arc<dyn SessionRepository>,
    store: Arc<dyn MessageStore>,
}

impl DeleteSessionHandler {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        repository: Arc<dyn SessionRepository>,
        store: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            identity,
            repository,
            store,
        }
    }

    pub async fn handle(&self, cmd: DeleteSessionCommand) -> Result<(), SessionError> {
        owned_session(self.identity.as_ref(), self.repository.as_ref(), cmd.session_id).await?;

        self.store
            .delete_for_session(&cmd.session_id)
            .await
            .map_err(|err| SessionError::infrastructure(err.to_string()))?;
        self.repository.delete(&cmd.session_id).await?;

        tracing::info!(session_id = %cmd.session_id, "Learning session deleted");
        Ok(())
    }
}
