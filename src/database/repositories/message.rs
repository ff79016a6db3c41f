use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::{DbResult, MessageRepository};
use crate::models::{Message, NewMessage};

#[derive(Debug, FromRow)]
struct MessageRow {
    id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    text: Option<String>,
    image: Option<String>,
    client_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            sender_id: row.sender_id,
            receiver_id: row.receiver_id,
            text: row.text,
            image: row.image,
            client_id: row.client_id,
            created_at: row.created_at,
            read_at: row.read_at,
        }
    }
}

pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn insert(&self, message: NewMessage) -> DbResult<Message> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (id, sender_id, receiver_id, text, image, client_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING id, sender_id, receiver_id, text, image, client_id, created_at, read_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(message.payload.text)
        .bind(message.payload.image)
        .bind(message.payload.client_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn conversation(&self, user: Uuid, peer: Uuid) -> DbResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, receiver_id, text, image, client_id, created_at, read_at
            FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user)
        .bind(peer)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn partner_ids(&self, user: Uuid) -> DbResult<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT partner_id
            FROM (
                SELECT CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END AS partner_id,
                       created_at
                FROM messages
                WHERE sender_id = $1 OR receiver_id = $1
            ) AS m
            GROUP BY partner_id
            ORDER BY MAX(created_at) DESC
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn unread_counts(&self, user: Uuid) -> DbResult<HashMap<Uuid, i64>> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT sender_id, COUNT(*) AS unread
            FROM messages
            WHERE receiver_id = $1 AND read_at IS NULL
            GROUP BY sender_id
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn mark_read(&self, user: Uuid, peer: Uuid) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read_at = NOW()
            WHERE receiver_id = $1 AND sender_id = $2 AND read_at IS NULL
            "#,
        )
        .bind(user)
        .bind(peer)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
