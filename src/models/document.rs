use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// 以文档形式存储的资源（社团、活动、机会）
pub trait Resource:
    Clone + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static
{
    /// 表名，同时用于日志
    const COLLECTION: &'static str;
    /// 部分更新请求体
    type Patch: DeserializeOwned + Send;

    fn validate(&self) -> Result<(), String>;

    fn apply(&mut self, patch: Self::Patch);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<T> {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Document<T> {
    pub fn new(body: T) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body,
        }
    }
}

pub(crate) fn require_str(field: &str, name: &str) -> Result<(), String> {
    if field.trim().is_empty() {
        Err(format!("{} is required", name))
    } else {
        Ok(())
    }
}

/// 仅在补丁提供字段时覆盖
pub(crate) fn patch<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// 可空字段：缺省为 `None`，显式 `null` 为 `Some(None)`，用于清空
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
