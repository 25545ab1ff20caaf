use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Message, MessageWithSender, RepositoryError, User};
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;
    /// 用户名查找为大小写敏感的精确匹配
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    /// 幂等地覆盖在线标志并持久化
    async fn set_online(&self, id: Uuid, is_online: bool) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: Message) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MessageWithSender>, RepositoryError>;

    /// 按创建时间倒序取最近的消息（`before` 为严格小于的游标）。
    /// 调用方负责反转为升序后再呈现
    async fn list_recent(
        &self,
        before: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<MessageWithSender>, RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
