use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::{DomainError, Message, MessageWithSender, SenderSummary};
use uuid::Uuid;

use crate::{clock::Clock, error::ApplicationError, repository::MessageRepository};

/// 默认的历史查询条数
const DEFAULT_HISTORY_LIMIT: u32 = 50;
/// 单次历史查询的条数上限
const MAX_HISTORY_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct PostMessageRequest {
    pub content: String,
    pub image_url: Option<String>,
}

pub struct MessageServiceDependencies {
    pub message_repository: Arc<dyn MessageRepository>,
    pub clock: Arc<dyn Clock>,
}

/// 消息用例服务：追加、历史查询、删除
pub struct MessageService {
    deps: MessageServiceDependencies,
}

impl MessageService {
    pub fn new(deps: MessageServiceDependencies) -> Self {
        Self { deps }
    }

    /// 追加一条消息并返回带发送者摘要的视图
    pub async fn post(
        &self,
        sender: SenderSummary,
        request: PostMessageRequest,
    ) -> Result<MessageWithSender, ApplicationError> {
        let message = Message::new(
            sender.id,
            request.content,
            request.image_url,
            self.deps.clock.now(),
        )?;
        self.deps.message_repository.create(message.clone()).await?;

        Ok(MessageWithSender { message, sender })
    }

    /// 历史查询。
    /// 存储按时间倒序取最近 N 条（`before` 游标为严格小于），
    /// 呈现前反转为升序，保证稳定的时间阅读顺序
    pub async fn history(
        &self,
        before: Option<DateTime<Utc>>,
        limit: Option<u32>,
    ) -> Result<Vec<MessageWithSender>, ApplicationError> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).min(MAX_HISTORY_LIMIT);
        let mut messages = self
            .deps
            .message_repository
            .list_recent(before, limit)
            .await?;
        messages.reverse();
        Ok(messages)
    }

    /// 删除消息，仅允许发送者本人
    pub async fn delete(
        &self,
        message_id: Uuid,
        requesting_user_id: Uuid,
    ) -> Result<(), ApplicationError> {
        let entry = self
            .deps
            .message_repository
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ApplicationError::Domain(DomainError::not_found("Message")))?;

        if entry.message.sender_id != requesting_user_id {
            return Err(ApplicationError::Domain(DomainError::forbidden(
                "Not authorized to delete this message",
            )));
        }

        self.deps.message_repository.delete(message_id).await?;
        Ok(())
    }
}
