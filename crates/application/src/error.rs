//! 应用层错误定义

use crate::password::PasswordHasherError;
use domain::{DomainError, RepositoryError};
use thiserror::Error;

/// 应用层错误类型
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 领域层错误（验证、资源不存在、权限不足）
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// 存储层错误
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// 密码哈希错误
    #[error(transparent)]
    Password(#[from] PasswordHasherError),

    /// 认证失败。刻意不区分用户名不存在和密码错误
    #[error("invalid credentials")]
    Authentication,
}
