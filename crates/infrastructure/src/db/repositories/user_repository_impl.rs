//! 用户Repository实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{RepositoryError, User};
use sqlx::{query, query_as, FromRow};
use uuid::Uuid;

use super::map_sqlx_error;
use crate::db::DbPool;
use application::UserRepository;

/// 数据库用户模型
#[derive(Debug, Clone, FromRow)]
struct DbUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub nickname: String,
    pub is_online: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(db_user: DbUser) -> Self {
        User {
            id: db_user.id,
            username: db_user.username,
            password_hash: db_user.password_hash,
            nickname: db_user.nickname,
            is_online: db_user.is_online,
            is_admin: db_user.is_admin,
            created_at: db_user.created_at,
            updated_at: db_user.updated_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, username, password_hash, nickname, is_online, is_admin, created_at, updated_at";

/// 用户Repository实现
pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let row = query_as::<_, DbUser>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        // text 列的等值比较天然是大小写敏感的精确匹配
        let row = query_as::<_, DbUser>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(User::from))
    }

    async fn set_online(&self, id: Uuid, is_online: bool) -> Result<(), RepositoryError> {
        query("UPDATE users SET is_online = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(is_online)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
