//! 用户服务单元测试

use super::tests::{arc, test_user, InMemoryUserRepository, PlainTextHasher};
use super::{UserService, UserServiceDependencies};
use crate::error::ApplicationError;
use domain::DomainError;
use uuid::Uuid;

fn service_with(users: Vec<domain::User>) -> UserService {
    UserService::new(UserServiceDependencies {
        user_repository: arc(InMemoryUserRepository::new(users)),
        password_hasher: arc(PlainTextHasher),
    })
}

#[tokio::test]
async fn authenticate_returns_user_for_valid_credentials() {
    let mum = test_user("mum", "Mum");
    let service = service_with(vec![mum.clone()]);

    let user = service.authenticate("mum", "mum").await.expect("auth");
    assert_eq!(user.id, mum.id);
    assert_eq!(user.username, "mum");
}

#[tokio::test]
async fn authenticate_fails_the_same_way_for_unknown_user_and_bad_password() {
    let service = service_with(vec![test_user("mum", "Mum")]);

    let unknown = service.authenticate("ghost", "mum").await.unwrap_err();
    let bad_password = service.authenticate("mum", "wrong").await.unwrap_err();

    // 两种失败必须不可区分
    assert!(matches!(unknown, ApplicationError::Authentication));
    assert!(matches!(bad_password, ApplicationError::Authentication));
    assert_eq!(unknown.to_string(), bad_password.to_string());
}

#[tokio::test]
async fn username_lookup_is_case_sensitive() {
    let service = service_with(vec![test_user("mum", "Mum")]);
    let err = service.authenticate("Mum", "mum").await.unwrap_err();
    assert!(matches!(err, ApplicationError::Authentication));
}

#[tokio::test]
async fn get_user_maps_missing_record_to_not_found() {
    let service = service_with(vec![]);
    let err = service.get_user(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::NotFound { .. })
    ));
}
