use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Message;

/// 推送到客户端的实时事件，序列化为 `{"type": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    NewMessage(Message),
    /// 建立连接时发送给该连接的在线用户快照
    OnlineUsers(Vec<Uuid>),
    UserOnline { user_id: Uuid },
    UserOffline { user_id: Uuid },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_is_tagged() {
        let user_id = Uuid::new_v4();
        let json = serde_json::to_value(ServerEvent::UserOnline { user_id }).unwrap();
        assert_eq!(json["type"], "userOnline");
        assert_eq!(json["data"]["user_id"], user_id.to_string());

        let json = serde_json::to_value(ServerEvent::OnlineUsers(vec![user_id])).unwrap();
        assert_eq!(json["type"], "onlineUsers");
        assert_eq!(json["data"][0], user_id.to_string());
    }
}
