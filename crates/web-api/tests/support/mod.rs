//! 集成测试脚手架
//!
//! 在随机端口上拉起完整路由，存储换成内存实现，
//! 密码哈希仍走 bcrypt（低成本因子）。

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use application::{
    MessageRepository, MessageService, MessageServiceDependencies, PasswordHasher, SessionGateway,
    SessionGatewayDependencies, SystemClock, UserRepository, UserService, UserServiceDependencies,
};
use domain::{Message, MessageWithSender, RepositoryError, SenderSummary, User};
use infrastructure::BcryptPasswordHasher;
use web_api::{router, AppState, JwtConfig, JwtService};

const TEST_JWT_SECRET: &str = "integration-test-secret";
const TEST_BCRYPT_COST: u32 = 4;

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        expiration_hours: 24,
    }
}

pub struct SeededUser {
    pub id: Uuid,
    pub username: String,
    pub password: String,
}

pub struct TestServer {
    pub base_url: String,
    pub ws_url: String,
    pub mum: SeededUser,
    pub dad: SeededUser,
}

/// 拉起一个带两个预置用户（mum/dad，密码均为 "secret"）的服务实例
pub async fn spawn_server() -> TestServer {
    let hasher = Arc::new(BcryptPasswordHasher::new(Some(TEST_BCRYPT_COST)));
    let password = "secret".to_string();
    let password_hash = hasher
        .hash(&password)
        .await
        .unwrap_or_else(|err| panic!("bcrypt hash failed: {err}"));

    let mum = User::new("mum", password_hash.clone(), "Mum").unwrap();
    let dad = User::new("dad", password_hash, "Dad").unwrap();
    let seeded = vec![mum.clone(), dad.clone()];

    let user_repository = Arc::new(InMemoryUserRepository::new(seeded.clone()));
    let message_repository = Arc::new(InMemoryMessageRepository::new(&seeded));
    let clock = Arc::new(SystemClock);

    let user_service = Arc::new(UserService::new(UserServiceDependencies {
        user_repository: user_repository.clone(),
        password_hasher: hasher,
    }));
    let message_service = Arc::new(MessageService::new(MessageServiceDependencies {
        message_repository,
        clock: clock.clone(),
    }));
    let session_gateway = Arc::new(SessionGateway::new(SessionGatewayDependencies {
        user_repository,
        message_service: message_service.clone(),
        clock,
    }));
    let jwt_service = Arc::new(JwtService::new(&jwt_config()));

    let app = router(
        AppState {
            user_service,
            message_service,
            session_gateway,
            jwt_service,
        },
        &["http://localhost:3000".to_string()],
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}"),
        ws_url: format!("ws://{addr}/ws"),
        mum: SeededUser {
            id: mum.id,
            username: mum.username,
            password: password.clone(),
        },
        dad: SeededUser {
            id: dad.id,
            username: dad.username,
            password,
        },
    }
}

/// 登录并返回访问令牌
pub async fn login(client: &reqwest::Client, base_url: &str, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200, "login should succeed for {username}");

    let body: serde_json::Value = response.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    fn new(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|user| (user.id, user)).collect()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn set_online(&self, id: Uuid, is_online: bool) -> Result<(), RepositoryError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.is_online = is_online;
        }
        Ok(())
    }
}

struct InMemoryMessageRepository {
    entries: RwLock<Vec<MessageWithSender>>,
    directory: HashMap<Uuid, SenderSummary>,
}

impl InMemoryMessageRepository {
    fn new(users: &[User]) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            directory: users
                .iter()
                .map(|user| (user.id, SenderSummary::from(user)))
                .collect(),
        }
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: Message) -> Result<(), RepositoryError> {
        let sender = self
            .directory
            .get(&message.sender_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        self.entries
            .write()
            .await
            .push(MessageWithSender { message, sender });
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MessageWithSender>, RepositoryError> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .find(|entry| entry.message.id == id)
            .cloned())
    }

    async fn list_recent(
        &self,
        before: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<MessageWithSender>, RepositoryError> {
        let entries = self.entries.read().await;
        let mut recent: Vec<MessageWithSender> = entries
            .iter()
            .filter(|entry| before.map_or(true, |cursor| entry.message.created_at < cursor))
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.message.created_at.cmp(&a.message.created_at));
        recent.truncate(limit as usize);
        Ok(recent)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut entries = self.entries.write().await;
        let before_len = entries.len();
        entries.retain(|entry| entry.message.id != id);
        if entries.len() == before_len {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
