use application::UserProfile;
use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use config::JwtConfig;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// JWT 载荷。`exp` 为 Unix 秒级时间戳
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub exp: i64,
}

/// 登录成功的响应体
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub token: String,
}

/// 签发和校验访问令牌
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_hours: i64,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            expiration_hours: config.expiration_hours,
        }
    }

    pub fn generate_token(&self, user_id: Uuid) -> Result<String, ApiError> {
        let expires_at = Utc::now() + Duration::hours(self.expiration_hours);
        let claims = Claims {
            user_id,
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|err| {
            tracing::error!(error = %err, "failed to sign access token");
            ApiError::internal_server_error()
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ApiError::unauthorized("Invalid token"))
    }

    /// 从 `Authorization: Bearer <token>` 请求头解析并校验令牌
    pub fn authenticate_headers(&self, headers: &HeaderMap) -> Result<Claims, ApiError> {
        let token = bearer_token(headers)
            .ok_or_else(|| ApiError::unauthorized("Authentication token is required"))?;
        self.verify_token(token)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_service(expiration_hours: i64) -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours,
        })
    }

    #[test]
    fn token_round_trip_preserves_user_id() {
        let service = jwt_service(24);
        let user_id = Uuid::new_v4();

        let token = service.generate_token(user_id).unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = jwt_service(-2);
        let token = service.generate_token(Uuid::new_v4()).unwrap();

        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let service = jwt_service(24);

        assert!(service.verify_token("not-a-jwt").is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = jwt_service(24).generate_token(Uuid::new_v4()).unwrap();

        let other = JwtService::new(&JwtConfig {
            secret: "different-secret".to_string(),
            expiration_hours: 24,
        });
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn missing_authorization_header_yields_required_message() {
        let service = jwt_service(24);
        let err = service.authenticate_headers(&HeaderMap::new()).unwrap_err();

        let body = format!("{:?}", err);
        assert!(body.contains("Authentication token is required"));
    }
}
