use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;

use super::ConversationStore;
use crate::error::{AppError, AppResult};
use crate::models::{Conversation, CreatedConversation, Message, NewMessage};

const CONVERSATION_COLUMNS: &str = r#"
    c.id, c.post_id, c.started_by_user_id, c.created_at,
    ARRAY(
        SELECT m.user_id FROM conversation_has_users m
        WHERE m.conversation_id = c.id
        ORDER BY m.user_id
    ) AS participant_ids
"#;

#[derive(FromRow)]
struct ConversationRow {
    id: i64,
    post_id: i64,
    started_by_user_id: i64,
    created_at: DateTime<Utc>,
    participant_ids: Vec<i64>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Conversation::new(
            row.id,
            row.post_id,
            row.started_by_user_id,
            row.participant_ids,
            row.created_at,
        )
    }
}

#[derive(Clone)]
pub struct PgConversationStore {
    pool: PgPool,
}

impl PgConversationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn find_by_post_and_starter(
        &self,
        post_id: i64,
        started_by_user_id: i64,
    ) -> AppResult<Option<Conversation>> {
        let sql = format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations c \
             WHERE c.post_id = $1 AND c.started_by_user_id = $2"
        );
        let row = sqlx::query_as::<_, ConversationRow>(&sql)
            .bind(post_id)
            .bind(started_by_user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Conversation::from))
    }

    async fn get_conversation(&self, conversation_id: i64) -> AppResult<Option<Conversation>> {
        let sql = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations c WHERE c.id = $1");
        let row = sqlx::query_as::<_, ConversationRow>(&sql)
            .bind(conversation_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Conversation::from))
    }

    async fn create_conversation(
        &self,
        post_id: i64,
        started_by_user_id: i64,
        participant_ids: &[i64],
    ) -> AppResult<CreatedConversation> {
        let mut tx = self.pool.begin().await?;

        let inserted: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            INSERT INTO conversations (post_id, started_by_user_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, started_by_user_id) DO NOTHING
            RETURNING id, created_at
            "#,
        )
        .bind(post_id)
        .bind(started_by_user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((id, created_at)) = inserted else {
            tx.rollback().await?;
            debug!(post_id, started_by_user_id, "conversation already exists, returning it");
            let existing = self
                .find_by_post_and_starter(post_id, started_by_user_id)
                .await?
                .ok_or_else(|| {
                    AppError::Database("conversation missing after insert conflict".into())
                })?;
            return Ok(CreatedConversation {
                conversation: existing,
                created: false,
            });
        };

        sqlx::query(
            r#"
            INSERT INTO conversation_has_users (conversation_id, user_id)
            SELECT $1, UNNEST($2::BIGINT[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(participant_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CreatedConversation {
            conversation: Conversation::new(
                id,
                post_id,
                started_by_user_id,
                participant_ids.to_vec(),
                created_at,
            ),
            created: true,
        })
    }

    async fn list_for_participant(
        &self,
        user_id: i64,
        post_id: Option<i64>,
        limit: i64,
    ) -> AppResult<Vec<Conversation>> {
        let sql = format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations c \
             JOIN conversation_has_users me ON me.conversation_id = c.id \
             WHERE me.user_id = $1 AND ($2::BIGINT IS NULL OR c.post_id = $2) \
             ORDER BY c.id ASC \
             LIMIT $3"
        );
        let rows = sqlx::query_as::<_, ConversationRow>(&sql)
            .bind(user_id)
            .bind(post_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Conversation::from).collect())
    }

    async fn insert_message(&self, message: NewMessage) -> AppResult<Message> {
        let row = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (conversation_id, from_user_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, conversation_id, from_user_id, body, created_at
            "#,
        )
        .bind(message.conversation_id)
        .bind(message.from_user_id)
        .bind(&message.body)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_messages(
        &self,
        conversation_id: i64,
        before_id: Option<i64>,
        limit: i64,
    ) -> AppResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, from_user_id, body, created_at
            FROM messages
            WHERE conversation_id = $1 AND ($2::BIGINT IS NULL OR id < $2)
            ORDER BY id DESC
            LIMIT $3
            "#,
        )
        .bind(conversation_id)
        .bind(before_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
