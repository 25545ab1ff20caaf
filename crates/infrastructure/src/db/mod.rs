//! 数据库连接与仓储实现

use sqlx::{Pool, Postgres};

pub mod repositories;

pub use repositories::{PgMessageRepository, PgUserRepository};

pub type DbPool = Pool<Postgres>;

/// 创建 PostgreSQL 连接池
pub async fn create_pg_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
