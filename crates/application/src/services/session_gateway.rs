//! 会话网关
//!
//! 实时层的核心：接入经过令牌验证的连接，维护用户与活跃会话的映射，
//! 并把入站事件扇出到其余会话。每个连接的状态机为
//! 接入 → 活跃（消息/输入事件）→ 断开；握手失败的连接不产生任何状态变更。
//!
//! 在线状态的唯一写入方就是这里：某用户的第一个会话建立时置为在线，
//! 最后一个会话关闭时置为离线。REST 登出通过 `disconnect_user`
//! 关闭该用户的全部会话，从而复用同一条离线路径。

use std::sync::Arc;

use domain::{ClientEvent, RepositoryError, SenderSummary, ServerEvent};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    clock::Clock,
    registry::{ActiveSession, SessionRegistry},
    repository::UserRepository,
    services::message_service::{MessageService, PostMessageRequest},
};

/// 握手阶段的接入失败
#[derive(Debug, Error)]
pub enum ConnectError {
    /// 令牌有效但用户记录已不存在
    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct SessionGatewayDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub message_service: Arc<MessageService>,
    pub clock: Arc<dyn Clock>,
}

pub struct SessionGateway {
    deps: SessionGatewayDependencies,
    registry: SessionRegistry,
}

impl SessionGateway {
    pub fn new(deps: SessionGatewayDependencies) -> Self {
        Self {
            deps,
            registry: SessionRegistry::new(),
        }
    }

    /// 接入一个已通过令牌验证的连接。
    /// 用户的第一个会话会把在线状态置为 true 并广播上线通知
    pub async fn connect(&self, user_id: Uuid) -> Result<ActiveSession, ConnectError> {
        let user = self
            .deps
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(ConnectError::UserNotFound)?;

        let (session, session_count) =
            self.registry.register(&user, self.deps.clock.now()).await;

        tracing::info!(user_id = %user.id, session_id = %session.session_id, "session established");

        if session_count == 1 {
            self.mark_online(user.id, true).await;
        }

        Ok(session)
    }

    /// 断开一个会话。该用户的最后一个会话关闭时置为离线并广播
    pub async fn disconnect(&self, session_id: Uuid) {
        let Some((user_id, remaining)) = self.registry.deregister(session_id).await else {
            return;
        };

        tracing::info!(user_id = %user_id, session_id = %session_id, remaining, "session closed");

        if remaining == 0 {
            self.mark_online(user_id, false).await;
        }
    }

    /// 关闭某个用户的全部会话（REST 登出路径）。
    /// 在线状态无条件置为离线，避免遗留过期的在线标志
    pub async fn disconnect_user(&self, user_id: Uuid) {
        let removed = self.registry.remove_user_sessions(user_id).await;

        if let Err(err) = self.deps.user_repository.set_online(user_id, false).await {
            tracing::error!(error = %err, user_id = %user_id, "failed to persist offline presence");
        }

        if removed > 0 {
            tracing::info!(user_id = %user_id, removed, "sessions force-closed by logout");
            self.registry
                .broadcast_all(&ServerEvent::UserStatus {
                    user_id,
                    is_online: false,
                })
                .await;
        }
    }

    /// 处理来自活跃会话的入站事件。
    /// 活跃期间的存储失败只记录日志并丢弃事件，不向客户端回错误
    pub async fn handle_event(&self, session_id: Uuid, event: ClientEvent) {
        let Some(identity) = self.registry.identity_of(session_id).await else {
            // 会话已被注销（例如并发登出），事件静默丢弃
            return;
        };

        match event {
            ClientEvent::SendMessage { content, image_url } => {
                let sender = SenderSummary {
                    id: identity.user_id,
                    username: identity.username,
                    nickname: identity.nickname,
                };
                match self
                    .deps
                    .message_service
                    .post(sender, PostMessageRequest { content, image_url })
                    .await
                {
                    Ok(entry) => {
                        // 包含发送者本人的连接，客户端以此确认消息已持久化
                        self.registry
                            .broadcast_all(&ServerEvent::new_message(&entry))
                            .await;
                    }
                    Err(err) => {
                        tracing::warn!(
                            error = %err,
                            user_id = %identity.user_id,
                            "dropping realtime message"
                        );
                    }
                }
            }
            ClientEvent::Typing { is_typing } => {
                self.registry
                    .broadcast_except(
                        session_id,
                        &ServerEvent::UserTyping {
                            user_id: identity.user_id,
                            username: identity.username,
                            is_typing,
                        },
                    )
                    .await;
            }
        }
    }

    pub async fn session_count_for(&self, user_id: Uuid) -> usize {
        self.registry.session_count_for(user_id).await
    }

    async fn mark_online(&self, user_id: Uuid, is_online: bool) {
        if let Err(err) = self.deps.user_repository.set_online(user_id, is_online).await {
            tracing::error!(error = %err, user_id = %user_id, "failed to persist presence");
        }
        self.registry
            .broadcast_all(&ServerEvent::UserStatus { user_id, is_online })
            .await;
    }
}
