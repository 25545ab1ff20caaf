//! 实时信道事件类型
//!
//! 入站和出站事件都用带标签的枚举表达，由 serde 的 `tag` 属性映射
//! 到线上的 `type` 字段，避免字符串键控的动态分发。

use crate::entities::{MessageWithSender, SenderSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 客户端发往服务端的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// 发送消息
    #[serde(rename_all = "camelCase")]
    SendMessage {
        #[serde(default)]
        content: String,
        #[serde(default)]
        image_url: Option<String>,
    },
    /// 输入状态提示
    #[serde(rename_all = "camelCase")]
    Typing { is_typing: bool },
}

/// 服务端广播给客户端的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// 新消息（包含发送者本人的连接，以此确认持久化成功）
    #[serde(rename_all = "camelCase")]
    NewMessage {
        id: Uuid,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
        sender: SenderSummary,
        timestamp: DateTime<Utc>,
    },
    /// 某用户正在输入（不会回送给发起连接）
    #[serde(rename_all = "camelCase")]
    UserTyping {
        user_id: Uuid,
        username: String,
        is_typing: bool,
    },
    /// 用户上下线通知
    #[serde(rename_all = "camelCase")]
    UserStatus { user_id: Uuid, is_online: bool },
}

impl ServerEvent {
    /// 由持久化后的消息构造广播事件
    pub fn new_message(entry: &MessageWithSender) -> Self {
        Self::NewMessage {
            id: entry.message.id,
            content: entry.message.content.clone(),
            image_url: entry.message.image_url.clone(),
            sender: entry.sender.clone(),
            timestamp: entry.message.created_at,
        }
    }
}
