//! CreateSessionHandler - Command handler for starting a new learning session.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::rewards::BadgeId;
use crate::domain::session::{LearningSession, SessionError};
use crate::ports::{IdentityProvider, RewardLedger, SessionRepository, TutorClient};

/// Command to create a new session from the learner's free-form request.
#[derive(Debug, Clone)]
pub struct CreateSessionCommand {
    /// What the learner typed, e.g. "I want to learn about photosynthesis".
    pub prompt: String,
}

/// Result of successful session creation.
#[derive(Debug, Clone)]
pub struct CreateSessionResult {
    pub session: LearningSession,
    /// True if this is the learner's first session.
    pub first_session: bool,
}

/// Handler for creating sessions.
pub struct CreateSessionHandler {
    identity: Arc<dyn IdentityProvider>,
    repository: Arc<dyn SessionRepository>,
    tutor: Arc<dyn TutorClient>,
    rewards: Arc<dyn RewardLedger>,
}

impl CreateSessionHandler {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        repository: Arc<dyn SessionRepository>,
        tutor: Arc<dyn TutorClient>,
        rewards: Arc<dyn RewardLedger>,
    ) -> Self {
        Self {
            identity,
            repository,
            tutor,
            rewards,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateSessionCommand,
    ) -> Result<CreateSessionResult, SessionError> {
        // 1. Require a signed-in learner
        let user = self.identity.require_user().await?;

        let prompt = cmd.prompt.trim();
        if prompt.is_empty() {
            return Err(SessionError::validation("topic", "Topic cannot be empty"));
        }

        // 2. Normalise the request into a short topic label
        let topic = self
            .tutor
            .extract_topic(prompt)
            .await
            .map_err(|err| SessionError::infrastructure(err.to_string()))?;

        // 3. Create and persist the session
        let session = LearningSession::new(SessionId::new(), user.id.clone(), topic)?;
        self.repository.save(&session).await?;

        // 4. Welcome badge on the first session, best-effort
        let first_session = self.repository.count_by_user(&user.id).await? == 1;
        if first_session {
            if let Err(err) = self.rewards.award_badge(&user.id, BadgeId::FirstSession).await {
                tracing::warn!(user_id = %user.id, error = %err, "Failed to award first session badge");
            }
        }

        tracing::info!(
            session_id = %session.id(),
            user_id = %user.id,
            topic = session.topic(),
            "Learning session created"
        );

        Ok(CreateSessionResult {
            session,
            first_session,
        })
    }
}
