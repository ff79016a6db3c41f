use axum::{
    extract::{
        Query, State,
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::Response,
};
use axum_extra::extract::CookieJar;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use super::PresenceRegistry;
use crate::error::{AppError, AppResult};
use crate::middleware::{authenticate, credential_from};
use crate::models::User;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SocketQuery {
    pub token: Option<String>,
}

/// 实时通道入口。升级前完成认证，失败直接返回 401，不会登记连接。
#[axum::debug_handler]
pub async fn socket_handler(
    State(state): State<AppState>,
    Query(query): Query<SocketQuery>,
    jar: CookieJar,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let token = query
        .token
        .or_else(|| credential_from(&jar, &headers))
        .ok_or(AppError::Unauthorized)?;
    let user = authenticate(&state, &token).await?;

    let presence = state.presence.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, presence, user)))
}

async fn handle_socket(socket: WebSocket, presence: PresenceRegistry, user: User) {
    let (connection_id, mut rx) = presence.register_connection(user.id);
    tracing::info!("User connected: {} ({})", user.full_name, connection_id);

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to encode realtime event: {}", e);
                    continue;
                }
            };
            if sender.send(WsMessage::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // 客户端只需保持连接，除关闭帧外的消息都忽略
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let WsMessage::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    presence.unregister_connection(connection_id);
    tracing::info!("User disconnected: {} ({})", user.full_name, connection_id);
}
