//! 对外载荷类型
//!
//! REST 与实时信道共享的序列化视图，字段名与前端约定保持 camelCase。

use chrono::{DateTime, Utc};
use domain::{MessageWithSender, SenderSummary, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 用户公开资料
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub nickname: String,
    pub avatar: String,
    pub is_online: bool,
    pub is_admin: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            nickname: user.nickname.clone(),
            avatar: user.avatar(),
            is_online: user.is_online,
            is_admin: user.is_admin,
        }
    }
}

/// 消息视图，带发送者摘要和 ISO 格式时间戳
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: Uuid,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub sender: SenderSummary,
    pub timestamp: DateTime<Utc>,
}

impl From<&MessageWithSender> for MessageDto {
    fn from(entry: &MessageWithSender) -> Self {
        Self {
            id: entry.message.id,
            content: entry.message.content.clone(),
            image_url: entry.message.image_url.clone(),
            sender: entry.sender.clone(),
            timestamp: entry.message.created_at,
        }
    }
}
