//! 消息实体定义
//!
//! 消息是不可变的聊天条目，创建时间作为全序键。

use crate::errors::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 消息内容长度上限
pub const MAX_CONTENT_LENGTH: usize = 2000;

/// 消息实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// 消息唯一ID
    pub id: Uuid,
    /// 文本内容（附带图片时可为空）
    pub content: String,
    /// 图片引用（可选）
    pub image_url: Option<String>,
    /// 发送者ID
    pub sender_id: Uuid,
    /// 创建时间，作为排序键
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// 创建新消息
    ///
    /// 不变量：文本内容和图片引用不能同时为空。
    pub fn new(
        sender_id: Uuid,
        content: impl Into<String>,
        image_url: Option<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let content = content.into();
        let image_url = image_url.filter(|url| !url.trim().is_empty());

        if content.trim().is_empty() && image_url.is_none() {
            return Err(DomainError::validation(
                "content",
                "message must have content or image",
            ));
        }
        if content.len() > MAX_CONTENT_LENGTH {
            return Err(DomainError::validation("content", "message too long"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            content,
            image_url,
            sender_id,
            created_at,
        })
    }
}

/// 发送者摘要，用于对外载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenderSummary {
    pub id: Uuid,
    pub username: String,
    pub nickname: String,
}

impl From<&crate::entities::User> for SenderSummary {
    fn from(user: &crate::entities::User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            nickname: user.nickname.clone(),
        }
    }
}

/// 带发送者信息的消息，历史查询的返回单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageWithSender {
    pub message: Message,
    pub sender: SenderSummary,
}
