//! PostgreSQL implementation of SessionRepository.
//!
//! Persists learning sessions to the `learning_sessions` table.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    ConfidenceScore, DomainError, ErrorCode, SessionId, Timestamp, UserId,
};
use crate::domain::session::LearningSession;
use crate::ports::SessionRepository;

/// PostgreSQL implementation of SessionRepository.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    /// Creates a new PostgresSessionRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, user_id, topic, completed, confidence_score, summary, \
                              feedback, created_at, updated_at";

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn save(&self, session: &LearningSession) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO learning_sessions (
                id, user_id, topic, completed, confidence_score, summary, feedback,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.user_id().as_str())
        .bind(session.topic())
        .bind(session.is_completed())
        .bind(session.confidence_score().map(|s| i16::from(s.value())))
        .bind(session.summary())
        .bind(session.feedback())
        .bind(session.created_at().as_datetime())
        .bind(session.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert session: {}", e)))?;

        Ok(())
    }

    async fn update(&self, session: &LearningSession) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE learning_sessions SET
                completed = $2,
                confidence_score = $3,
                summary = $4,
                feedback = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.is_completed())
        .bind(session.confidence_score().map(|s| i16::from(s.value())))
        .bind(session.summary())
        .bind(session.feedback())
        .bind(session.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update session: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<LearningSession>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM learning_sessions WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch session: {}", e)))?;

        row.map(row_to_session).transpose()
    }

    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<LearningSession>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM learning_sessions WHERE user_id = $1 ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch sessions by user: {}", e)))?;

        rows.into_iter().map(row_to_session).collect()
    }

    async fn count_by_user(&self, user_id: &UserId) -> Result<u32, DomainError> {
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM learning_sessions WHERE user_id = $1")
                .bind(user_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to count sessions: {}", e)))?;

        Ok(result.0 as u32)
    }

    async fn completed_topics(&self, user_id: &UserId) -> Result<Vec<String>, DomainError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT topic FROM learning_sessions
            WHERE user_id = $1 AND completed = TRUE
            ORDER BY topic
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch completed topics: {}", e)))?;

        Ok(rows.into_iter().map(|(topic,)| topic).collect())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM learning_sessions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to delete session: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", id),
            ));
        }

        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn column<'r, T>(row: &'r sqlx::postgres::PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::database(format!("Failed to get {}: {}", name, e)))
}

fn score_from_column(raw: Option<i16>) -> Result<Option<ConfidenceScore>, DomainError> {
    raw.map(|value| {
        ConfidenceScore::try_new(i64::from(value))
            .map_err(|e| DomainError::database(format!("Invalid confidence_score: {}", e)))
    })
    .transpose()
}

fn row_to_session(row: sqlx::postgres::PgRow) -> Result<LearningSession, DomainError> {
    let id: uuid::Uuid = column(&row, "id")?;
    let user_id: String = column(&row, "user_id")?;
    let created_at: chrono::DateTime<chrono::Utc> = column(&row, "created_at")?;
    let updated_at: chrono::DateTime<chrono::Utc> = column(&row, "updated_at")?;

    Ok(LearningSession::reconstitute(
        SessionId::from_uuid(id),
        UserId::new(user_id)
            .map_err(|e| DomainError::database(format!("Invalid user_id: {}", e)))?,
        column(&row, "topic")?,
        column(&row, "completed")?,
        score_from_column(column(&row, "confidence_score")?)?,
        column(&row, "summary")?,
        column(&row, "feedback")?,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}
