use std::sync::Arc;

use application::{MessageService, SessionGateway, UserService};

use crate::auth::JwtService;

/// 路由层共享状态
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub message_service: Arc<MessageService>,
    pub session_gateway: Arc<SessionGateway>,
    pub jwt_service: Arc<JwtService>,
}
