//! 消息Repository实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Message, MessageWithSender, RepositoryError, SenderSummary};
use sqlx::{query, query_as, FromRow};
use uuid::Uuid;

use super::map_sqlx_error;
use crate::db::DbPool;
use application::MessageRepository;

/// 数据库消息模型，联结了发送者摘要
#[derive(Debug, Clone, FromRow)]
struct DbMessageRow {
    pub id: Uuid,
    pub content: String,
    pub image_url: Option<String>,
    pub sender_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub sender_username: String,
    pub sender_nickname: String,
}

impl From<DbMessageRow> for MessageWithSender {
    fn from(row: DbMessageRow) -> Self {
        MessageWithSender {
            message: Message {
                id: row.id,
                content: row.content,
                image_url: row.image_url,
                sender_id: row.sender_id,
                created_at: row.created_at,
            },
            sender: SenderSummary {
                id: row.sender_id,
                username: row.sender_username,
                nickname: row.sender_nickname,
            },
        }
    }
}

const MESSAGE_SELECT: &str = r#"
    SELECT m.id, m.content, m.image_url, m.sender_id, m.created_at,
           u.username AS sender_username, u.nickname AS sender_nickname
    FROM messages m
    JOIN users u ON u.id = m.sender_id
"#;

/// 消息Repository实现
pub struct PgMessageRepository {
    pool: DbPool,
}

impl PgMessageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, message: Message) -> Result<(), RepositoryError> {
        query(
            r#"
            INSERT INTO messages (id, content, image_url, sender_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id)
        .bind(&message.content)
        .bind(&message.image_url)
        .bind(message.sender_id)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MessageWithSender>, RepositoryError> {
        let row = query_as::<_, DbMessageRow>(&format!("{} WHERE m.id = $1", MESSAGE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(MessageWithSender::from))
    }

    async fn list_recent(
        &self,
        before: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<MessageWithSender>, RepositoryError> {
        // 始终按创建时间倒序取最近的一页；升序呈现由调用方负责
        let rows = match before {
            Some(cursor) => {
                query_as::<_, DbMessageRow>(&format!(
                    "{} WHERE m.created_at < $1 ORDER BY m.created_at DESC LIMIT $2",
                    MESSAGE_SELECT
                ))
                .bind(cursor)
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                query_as::<_, DbMessageRow>(&format!(
                    "{} ORDER BY m.created_at DESC LIMIT $1",
                    MESSAGE_SELECT
                ))
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(MessageWithSender::from).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
