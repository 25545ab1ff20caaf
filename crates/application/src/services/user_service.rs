use std::sync::Arc;

use domain::{DomainError, User};
use uuid::Uuid;

use crate::{error::ApplicationError, password::PasswordHasher, repository::UserRepository};

pub struct UserServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
}

/// 用户用例服务：凭证校验与资料读取
pub struct UserService {
    deps: UserServiceDependencies,
}

impl UserService {
    pub fn new(deps: UserServiceDependencies) -> Self {
        Self { deps }
    }

    /// 校验用户名/密码。
    /// 用户不存在和密码不匹配返回同一个错误，不泄露哪个字段错了
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, ApplicationError> {
        let user = self
            .deps
            .user_repository
            .find_by_username(username)
            .await?
            .ok_or(ApplicationError::Authentication)?;

        let matches = self
            .deps
            .password_hasher
            .verify(password, &user.password_hash)
            .await?;
        if !matches {
            return Err(ApplicationError::Authentication);
        }

        Ok(user)
    }

    /// 读取用户资料
    pub async fn get_user(&self, id: Uuid) -> Result<User, ApplicationError> {
        self.deps
            .user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::Domain(DomainError::not_found("User")))
    }
}
