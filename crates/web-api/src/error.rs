use application::ApplicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// 对外统一的错误载荷
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                message: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal_server_error() -> Self {
        // 不向客户端泄露内部细节
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        use domain::{DomainError, RepositoryError};

        match error {
            ApplicationError::Domain(DomainError::ValidationError { message, .. }) => {
                ApiError::bad_request(message)
            }
            ApplicationError::Domain(DomainError::NotFound { resource }) => {
                ApiError::not_found(format!("{} not found", resource))
            }
            ApplicationError::Domain(DomainError::Forbidden { action }) => {
                ApiError::forbidden(action)
            }
            ApplicationError::Authentication => ApiError::unauthorized("Invalid credentials"),
            ApplicationError::Repository(RepositoryError::NotFound) => {
                ApiError::not_found("Resource not found")
            }
            ApplicationError::Repository(repo_err) => {
                tracing::error!(error = %repo_err, "storage failure");
                ApiError::internal_server_error()
            }
            ApplicationError::Password(err) => {
                tracing::error!(error = %err, "password hashing failure");
                ApiError::internal_server_error()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
