//! GetSessionTurnsHandler - Query handler for a session's dialogue transcript.

use std::sync::Arc;

use crate::domain::conversation::Turn;
use crate::domain::foundation::SessionId;
use crate::domain::session::SessionError;
use crate::ports::{IdentityProvider, MessageStore, SessionRepository};

use super::get_session::owned_session;

/// Query for the turns of one session.
#[derive(Debug, Clone)]
pub struct GetSessionTurnsQuery {
    pub session_id: SessionId,
}

/// Handler returning a session's turns in sequence order.
pub struct GetSessionTurnsHandler {
    identity: Arc<dyn IdentityProvider>,
    repository: Arc<dyn SessionRepository>,
    store: Arc<dyn MessageStore>,
}

impl GetSessionTurnsHandler {
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

    pub async fn handle(&self, query: GetSessionTurnsQuery) -> Result<Vec<Turn>, SessionError> {
        owned_session(self.identity.as_ref(), self.repository.as_ref(), query.session_id).await?;

        self.store
            .list(&query.session_id)
            .await
            .map_err(|err| SessionError::infrastructure(err.to_string()))
    }
}
