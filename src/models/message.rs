use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 私信记录，创建后只会发生已读状态变化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub text: Option<String>,
    pub image: Option<String>,
    /// 发送端生成的关联 ID，用于替换乐观插入的本地消息
    pub client_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// 消息是否属于 a 与 b 之间的会话
    pub fn is_between(&self, a: Uuid, b: Uuid) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
}

impl MessagePayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// 去掉空白内容；文本和图片都为空时返回 None
    pub fn normalized(self) -> Option<Self> {
        let text = self.text.filter(|t| !t.trim().is_empty());
        let image = self
            .image
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty());
        if text.is_none() && image.is_none() {
            return None;
        }
        Some(Self {
            text,
            image,
            client_id: self.client_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub payload: MessagePayload,
}
