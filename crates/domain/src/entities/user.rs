//! 用户实体定义
//!
//! 包含用户的核心信息和相关操作。用户由带外的初始化脚本创建，
//! 核心层只负责读取和在线状态的更新。

use crate::errors::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 用户实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// 用户唯一ID
    pub id: Uuid,
    /// 用户名（唯一，创建后不可变）
    pub username: String,
    /// 密码哈希（敏感信息，不在序列化中包含）
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// 显示昵称
    pub nickname: String,
    /// 在线状态，由活跃连接数派生
    pub is_online: bool,
    /// 是否为管理员
    pub is_admin: bool,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 创建新用户
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        nickname: impl Into<String>,
    ) -> DomainResult<Self> {
        let username = username.into();
        let nickname = nickname.into();

        Self::validate_username(&username)?;

        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            username,
            password_hash: password_hash.into(),
            nickname,
            is_online: false,
            is_admin: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// 头像地址，由用户名确定性派生
    pub fn avatar(&self) -> String {
        format!("/images/{}.jpeg", self.username)
    }

    /// 验证用户名
    fn validate_username(username: &str) -> DomainResult<()> {
        if username.trim().is_empty() {
            return Err(DomainError::validation("username", "must not be empty"));
        }
        if username.len() < 3 {
            return Err(DomainError::validation(
                "username",
                "must be at least 3 characters",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_is_derived_from_username() {
        let user = User::new("mum", "$2b$hash", "Mum").unwrap();
        assert_eq!(user.avatar(), "/images/mum.jpeg");
    }

    #[test]
    fn short_username_is_rejected() {
        assert!(User::new("ab", "$2b$hash", "AB").is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User::new("dad", "$2b$secret", "Dad").unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("password_hash"));
    }
}
