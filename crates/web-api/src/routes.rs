use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use application::{MessageDto, PostMessageRequest, UserProfile};
use domain::{SenderSummary, User};

use crate::{auth::LoginResponse, error::ApiError, state::AppState, websocket};

/// 组装完整路由，挂载 CORS 与请求追踪
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/profile", get(profile))
        .route("/api/messages", get(list_messages).post(create_message))
        .route("/api/messages/{id}", axum::routing::delete(delete_message))
        .route("/ws", get(websocket::websocket_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    username: Option<String>,
    password: Option<String>,
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (username, password) = match (payload.username, payload.password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            (username, password)
        }
        _ => return Err(ApiError::bad_request("Username and password are required")),
    };

    let user = state.user_service.authenticate(&username, &password).await?;
    let token = state.jwt_service.generate_token(user.id)?;

    tracing::info!(username = %user.username, "user logged in");
    Ok(Json(LoginResponse {
        user: UserProfile::from(&user),
        token,
    }))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = authenticated_user(&state, &headers).await?;

    // 登出同时强制关闭该用户的所有实时会话
    state.session_gateway.disconnect_user(user.id).await;

    tracing::info!(username = %user.username, "user logged out");
    Ok(Json(json!({ "message": "Logged out successfully" })))
}

async fn profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, ApiError> {
    let user = authenticated_user(&state, &headers).await?;
    Ok(Json(UserProfile::from(&user)))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    before: Option<DateTime<Utc>>,
    limit: Option<u32>,
}

async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    authenticated_user(&state, &headers).await?;

    let messages = state
        .message_service
        .history(query.before, query.limit)
        .await?;
    Ok(Json(messages.iter().map(MessageDto::from).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMessagePayload {
    #[serde(default)]
    content: String,
    #[serde(default)]
    image_url: Option<String>,
}

async fn create_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateMessagePayload>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let user = authenticated_user(&state, &headers).await?;

    let has_image = payload
        .image_url
        .as_deref()
        .is_some_and(|url| !url.trim().is_empty());
    if payload.content.trim().is_empty() && !has_image {
        return Err(ApiError::bad_request("Message must have content or image"));
    }

    let entry = state
        .message_service
        .post(
            SenderSummary::from(&user),
            PostMessageRequest {
                content: payload.content,
                image_url: payload.image_url,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(MessageDto::from(&entry))))
}

async fn delete_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user = authenticated_user(&state, &headers).await?;

    state.message_service.delete(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 解析令牌并加载当前用户。令牌有效但用户已不存在时返回 404
async fn authenticated_user(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let claims = state.jwt_service.authenticate_headers(headers)?;
    state
        .user_service
        .get_user(claims.user_id)
        .await
        .map_err(ApiError::from)
}
