//! PostgreSQL implementation of MessageStore.
//!
//! Turns live in `conversation_messages`; a unique index on
//! `(session_id, sequence_number)` enforces one turn per sequence.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::conversation::{Sender, Turn, TurnDraft, TurnKind};
use crate::domain::foundation::{SessionId, Timestamp, TurnId};
use crate::ports::{MessageStore, StoreError};

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL implementation of MessageStore.
#[derive(Clone)]
pub struct PostgresMessageStore {
    pool: PgPool,
}

impl PostgresMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PostgresMessageStore {
    async fn append(&self, draft: TurnDraft) -> Result<Turn, StoreError> {
        let turn = Turn::from_draft(draft)?;

        sqlx::query(
            r#"
            INSERT INTO conversation_messages (
                id, session_id, content, sender, message_type, sequence_number, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(turn.id().as_uuid())
        .bind(turn.session_id().as_uuid())
        .bind(turn.content())
        .bind(turn.sender().as_str())
        .bind(turn.kind().as_str())
        .bind(turn.sequence() as i32)
        .bind(turn.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StoreError::Conflict {
                    session_id: *turn.session_id(),
                    sequence: turn.sequence(),
                }
            }
            _ => StoreError::backend(format!("Failed to insert turn: {}", e)),
        })?;

        Ok(turn)
    }

    async fn list(&self, session_id: &SessionId) -> Result<Vec<Turn>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, content, sender, message_type, sequence_number, created_at
            FROM conversation_messages
            WHERE session_id = $1
            ORDER BY sequence_number ASC
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend(format!("Failed to fetch turns: {}", e)))?;

        rows.into_iter().map(row_to_turn).collect()
    }

    async fn delete_for_session(&self, session_id: &SessionId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM conversation_messages WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::backend(format!("Failed to delete turns: {}", e)))?;
        Ok(())
    }
}

fn row_to_turn(row: sqlx::postgres::PgRow) -> Result<Turn, StoreError> {
    let get_err = |name: &str, e: sqlx::Error| StoreError::backend(format!("Failed to get {}: {}", name, e));

    let id: uuid::Uuid = row.try_get("id").map_err(|e| get_err("id", e))?;
    let session_id: uuid::Uuid = row.try_get("session_id").map_err(|e| get_err("session_id", e))?;
    let content: String = row.try_get("content").map_err(|e| get_err("content", e))?;
    let sender: String = row.try_get("sender").map_err(|e| get_err("sender", e))?;
    let kind: String = row
        .try_get("message_type")
        .map_err(|e| get_err("message_type", e))?;
    let sequence: i32 = row
        .try_get("sequence_number")
        .map_err(|e| get_err("sequence_number", e))?;
    let created_at: chrono::DateTime<chrono::Utc> =
        row.try_get("created_at").map_err(|e| get_err("created_at", e))?;

    let sequence = u32::try_from(sequence)
        .map_err(|_| StoreError::backend(format!("Invalid sequence_number: {}", sequence)))?;

    Ok(Turn::reconstitute(
        TurnId::from_uuid(id),
        SessionId::from_uuid(session_id),
        content,
        sender.parse::<Sender>()?,
        kind.parse::<TurnKind>()?,
        sequence,
        Timestamp::from_datetime(created_at),
    ))
}
