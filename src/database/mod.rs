// 数据库模块
// 仓储接口定义，PostgreSQL 与内存两种实现

pub mod memory;
pub mod repositories;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    Club, Document, Event, Message, NewMessage, NewUser, Opportunity, ProfileUpdate, Resource,
    Role, User,
};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("duplicate value for {0}")]
    Duplicate(&'static str),
    #[error("invalid stored value: {0}")]
    Corrupt(String),
}

pub type DbResult<T> = Result<T, DbError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 邮箱已存在时返回 `DbError::Duplicate("email")`
    async fn create(&self, user: NewUser) -> DbResult<User>;
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<User>>;
    /// 传入的邮箱需已经规范化
    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>>;
    async fn find_many(&self, ids: &[Uuid]) -> DbResult<Vec<User>>;
    async fn list_except(&self, id: Uuid) -> DbResult<Vec<User>>;
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> DbResult<Option<User>>;
    async fn record_login(&self, id: Uuid) -> DbResult<()>;
    async fn set_role(&self, id: Uuid, role: Role) -> DbResult<()>;
    async fn set_password(&self, id: Uuid, password_hash: &str) -> DbResult<()>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: NewMessage) -> DbResult<Message>;
    /// 双向消息，按创建时间升序
    async fn conversation(&self, user: Uuid, peer: Uuid) -> DbResult<Vec<Message>>;
    /// 有过消息往来的用户，最近的会话在前
    async fn partner_ids(&self, user: Uuid) -> DbResult<Vec<Uuid>>;
    /// 发给 user 的未读消息数，按发送者分组，只包含非零项
    async fn unread_counts(&self, user: Uuid) -> DbResult<HashMap<Uuid, i64>>;
    /// 将 peer 发给 user 的未读消息全部标记为已读，返回变更条数
    async fn mark_read(&self, user: Uuid, peer: Uuid) -> DbResult<u64>;
}

#[async_trait]
pub trait Collection<T: Resource>: Send + Sync {
    async fn list(&self) -> DbResult<Vec<Document<T>>>;
    async fn get(&self, id: Uuid) -> DbResult<Option<Document<T>>>;
    async fn insert(&self, body: T) -> DbResult<Document<T>>;
    /// 整体替换文档内容，文档不存在时返回 None
    async fn replace(&self, id: Uuid, body: T) -> DbResult<Option<Document<T>>>;
    async fn delete(&self, id: Uuid) -> DbResult<bool>;
}

#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub clubs: Arc<dyn Collection<Club>>,
    pub events: Arc<dyn Collection<Event>>,
    pub opportunities: Arc<dyn Collection<Opportunity>>,
}

impl Store {
    pub fn postgres(pool: PgPool) -> Self {
        use repositories::{PgCollection, PgMessageRepository, PgUserRepository};

        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            messages: Arc::new(PgMessageRepository::new(pool.clone())),
            clubs: Arc::new(PgCollection::new(pool.clone())),
            events: Arc::new(PgCollection::new(pool.clone())),
            opportunities: Arc::new(PgCollection::new(pool)),
        }
    }

    pub fn memory() -> Self {
        use memory::{MemoryCollection, MemoryMessageRepository, MemoryUserRepository};

        Self {
            users: Arc::new(MemoryUserRepository::default()),
            messages: Arc::new(MemoryMessageRepository::default()),
            clubs: Arc::new(MemoryCollection::default()),
            events: Arc::new(MemoryCollection::default()),
            opportunities: Arc::new(MemoryCollection::default()),
        }
    }
}

/// 启动时执行数据库迁移
pub async fn migrate(pool: &PgPool) -> DbResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
