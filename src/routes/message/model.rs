use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    database::Store,
    error::{AppError, AppResult},
    models::{Message, MessagePayload, NewMessage},
    realtime::{PresenceRegistry, ServerEvent},
};

/// 发送者 ID 到未读条数
pub type UnreadCounts = HashMap<Uuid, i64>;

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

/// 先持久化，再推送给接收者当前在线的连接。
///
/// 返回保存后的消息和实际入队的连接数；接收者离线时为 0，消息只能通过
/// 历史记录或未读数查询获得。
pub async fn deliver_message(
    store: &Store,
    presence: &PresenceRegistry,
    sender_id: Uuid,
    receiver_id: Uuid,
    payload: MessagePayload,
) -> AppResult<(Message, usize)> {
    let payload = payload
        .normalized()
        .ok_or_else(|| AppError::validation("Message must contain text or an image"))?;

    if store.users.find_by_id(receiver_id).await?.is_none() {
        return Err(AppError::not_found("Receiver not found"));
    }

    let message = store
        .messages
        .insert(NewMessage {
            sender_id,
            receiver_id,
            payload,
        })
        .await?;

    let delivered = presence.send_to_user(receiver_id, &ServerEvent::NewMessage(message.clone()));
    tracing::debug!(
        "Message {} from {} to {} pushed to {} connection(s)",
        message.id,
        sender_id,
        receiver_id,
        delivered
    );

    Ok((message, delivered))
}
