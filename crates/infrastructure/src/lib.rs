//! 基础设施层
//!
//! PostgreSQL 仓储实现和 bcrypt 密码哈希适配器。

pub mod db;
pub mod password;

pub use db::{create_pg_pool, DbPool, PgMessageRepository, PgUserRepository};
pub use password::BcryptPasswordHasher;
