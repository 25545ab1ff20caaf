use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use application::{ActiveSession, ConnectError};
use domain::ClientEvent;

use crate::state::AppState;

/// 鉴权失败时的应用层关闭码
const CLOSE_UNAUTHORIZED: u16 = 4401;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// WebSocket 入口。
/// 始终完成协议升级，再在已建立的连接上做鉴权：
/// 拒绝原因通过关闭帧送达客户端，而不是 HTTP 错误码
pub async fn websocket_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.token))
}

async fn handle_socket(socket: WebSocket, state: AppState, token: Option<String>) {
    let user_id = match authenticate_handshake(&state, token.as_deref()) {
        Ok(user_id) => user_id,
        Err(reason) => {
            reject(socket, reason).await;
            return;
        }
    };

    let session = match state.session_gateway.connect(user_id).await {
        Ok(session) => session,
        Err(ConnectError::UserNotFound) => {
            reject(socket, "User not found").await;
            return;
        }
        Err(err) => {
            tracing::error!(error = %err, %user_id, "failed to establish realtime session");
            reject(socket, "Internal server error").await;
            return;
        }
    };

    run_session(socket, state, session).await;
}

fn authenticate_handshake(state: &AppState, token: Option<&str>) -> Result<Uuid, &'static str> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or("Authentication token is required")?;
    state
        .jwt_service
        .verify_token(token)
        .map(|claims| claims.user_id)
        .map_err(|_| "Invalid token")
}

async fn reject(mut socket: WebSocket, reason: &'static str) {
    let frame = CloseFrame {
        code: CLOSE_UNAUTHORIZED,
        reason: reason.into(),
    };
    if let Err(err) = socket.send(Message::Close(Some(frame))).await {
        tracing::debug!(error = %err, "failed to deliver rejection close frame");
    }
}

/// 会话主循环：出站泵把会话事件写入连接，入站循环解析客户端事件。
/// 任一方向结束即整体收尾，并通过网关注销会话
async fn run_session(socket: WebSocket, state: AppState, mut session: ActiveSession) {
    let session_id = session.session_id;
    tracing::info!(username = %session.username, %session_id, "realtime session established");

    let (mut ws_sender, mut ws_receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = session.events.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(err) => {
                    tracing::error!(error = %err, "failed to serialize outbound event");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
        // 通道关闭说明会话已被注销，主动关闭连接
        let _ = ws_sender.send(Message::Close(None)).await;
    });

    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = ws_receiver.next().await {
            match message {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => recv_state.session_gateway.handle_event(session_id, event).await,
                    Err(err) => {
                        tracing::debug!(error = %err, %session_id, "ignoring malformed client event");
                    }
                },
                Message::Close(_) => break,
                // Ping/Pong 由底层协议栈应答
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.session_gateway.disconnect(session_id).await;
    tracing::info!(%session_id, "realtime session closed");
}
