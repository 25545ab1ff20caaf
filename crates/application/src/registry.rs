//! 活跃会话注册表
//!
//! 进程级的共享状态：用户与活跃连接之间的映射，以及广播扇出集合。
//! 注册表由会话网关独占持有，只暴露表达意图的操作而非裸的 map 访问。

use chrono::{DateTime, Utc};
use domain::{ServerEvent, User};
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// 单个活跃会话的注册信息
struct SessionEntry {
    user_id: Uuid,
    username: String,
    nickname: String,
    established_at: DateTime<Utc>,
    sender: mpsc::UnboundedSender<ServerEvent>,
}

/// 注册成功后返回给连接处理器的会话句柄
#[derive(Debug)]
pub struct ActiveSession {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub nickname: String,
    /// 该会话的出站事件流；注册表持有对应的发送端
    pub events: mpsc::UnboundedReceiver<ServerEvent>,
}

/// 身份快照，处理入站事件时使用
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub user_id: Uuid,
    pub username: String,
    pub nickname: String,
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个新会话，返回会话句柄和该用户注册后的会话数
    pub async fn register(&self, user: &User, established_at: DateTime<Utc>) -> (ActiveSession, usize) {
        let (sender, events) = mpsc::unbounded_channel();
        let session_id = Uuid::new_v4();

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            session_id,
            SessionEntry {
                user_id: user.id,
                username: user.username.clone(),
                nickname: user.nickname.clone(),
                established_at,
                sender,
            },
        );
        let count = sessions
            .values()
            .filter(|entry| entry.user_id == user.id)
            .count();

        (
            ActiveSession {
                session_id,
                user_id: user.id,
                username: user.username.clone(),
                nickname: user.nickname.clone(),
                events,
            },
            count,
        )
    }

    /// 注销会话，返回所属用户和该用户剩余的会话数
    pub async fn deregister(&self, session_id: Uuid) -> Option<(Uuid, usize)> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.remove(&session_id)?;
        let remaining = sessions
            .values()
            .filter(|other| other.user_id == entry.user_id)
            .count();
        Some((entry.user_id, remaining))
    }

    /// 移除某个用户的全部会话（REST 登出），返回移除的数量。
    /// 发送端随注册项一起销毁，对应连接的发送循环会随之结束
    pub async fn remove_user_sessions(&self, user_id: Uuid) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.user_id != user_id);
        before - sessions.len()
    }

    pub async fn session_count_for(&self, user_id: Uuid) -> usize {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .filter(|entry| entry.user_id == user_id)
            .count()
    }

    pub async fn identity_of(&self, session_id: Uuid) -> Option<SessionIdentity> {
        let sessions = self.sessions.read().await;
        sessions.get(&session_id).map(|entry| SessionIdentity {
            user_id: entry.user_id,
            username: entry.username.clone(),
            nickname: entry.nickname.clone(),
        })
    }

    pub async fn established_at(&self, session_id: Uuid) -> Option<DateTime<Utc>> {
        let sessions = self.sessions.read().await;
        sessions.get(&session_id).map(|entry| entry.established_at)
    }

    /// 发送事件到所有活跃会话。
    /// 同一调用方提交的事件按提交顺序送达每个接收者
    pub async fn broadcast_all(&self, event: &ServerEvent) {
        let sessions = self.sessions.read().await;
        for entry in sessions.values() {
            // 发送失败说明对端已断开，由其自身的断开路径负责清理
            let _ = entry.sender.send(event.clone());
        }
    }

    /// 发送事件到除指定会话外的所有活跃会话
    pub async fn broadcast_except(&self, origin: Uuid, event: &ServerEvent) {
        let sessions = self.sessions.read().await;
        for (session_id, entry) in sessions.iter() {
            if *session_id == origin {
                continue;
            }
            let _ = entry.sender.send(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user(username: &str) -> User {
        User::new(username, "hash", username).unwrap()
    }

    #[tokio::test]
    async fn register_counts_sessions_per_user() {
        let registry = SessionRegistry::new();
        let mum = user("mum");
        let dad = user("dad");
        let now = Utc::now();

        let (first, count) = registry.register(&mum, now).await;
        assert_eq!(count, 1);
        let (_second, count) = registry.register(&mum, now).await;
        assert_eq!(count, 2);
        let (_other, count) = registry.register(&dad, now).await;
        assert_eq!(count, 1);

        assert_eq!(registry.session_count_for(mum.id).await, 2);
        let (owner, remaining) = registry.deregister(first.session_id).await.unwrap();
        assert_eq!(owner, mum.id);
        assert_eq!(remaining, 1);
        assert!(registry.deregister(first.session_id).await.is_none());
    }

    #[tokio::test]
    async fn registry_keeps_the_establishment_time() {
        let registry = SessionRegistry::new();
        let established = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let (session, _) = registry.register(&user("mum"), established).await;
        assert_eq!(
            registry.established_at(session.session_id).await,
            Some(established)
        );
    }

    #[tokio::test]
    async fn remove_user_sessions_drops_only_that_user() {
        let registry = SessionRegistry::new();
        let mum = user("mum");
        let dad = user("dad");
        let now = Utc::now();
        registry.register(&mum, now).await;
        registry.register(&mum, now).await;
        let (dad_session, _) = registry.register(&dad, now).await;

        assert_eq!(registry.remove_user_sessions(mum.id).await, 2);
        assert_eq!(registry.session_count_for(mum.id).await, 0);
        assert!(registry.identity_of(dad_session.session_id).await.is_some());
    }
}
