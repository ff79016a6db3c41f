//! 进程内存储，未配置数据库时使用，也用于测试

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Collection, DbError, DbResult, MessageRepository, UserRepository};
use crate::models::{Document, Message, NewMessage, NewUser, ProfileUpdate, Resource, Role, User};

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> DbResult<User> {
        let mut users = self.users.write().await;
        // 与数据库唯一索引保持一致，查重与插入在同一把锁内完成
        if users.values().any(|u| u.email == user.email) {
            return Err(DbError::Duplicate("email"));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            batch: user.batch,
            cur_role: user.cur_role,
            company: user.company,
            location: user.location,
            profile_pic: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> DbResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn list_except(&self, id: Uuid) -> DbResult<Vec<User>> {
        let users = self.users.read().await;
        let mut listed: Vec<User> = users.values().filter(|u| u.id != id).cloned().collect();
        listed.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(listed)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> DbResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            update.apply(user);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn record_login(&self, id: Uuid) -> DbResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> DbResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.role = role;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> DbResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// 消息按插入顺序保存
#[derive(Default)]
pub struct MemoryMessageRepository {
    messages: RwLock<Vec<Message>>,
}

#[async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn insert(&self, message: NewMessage) -> DbResult<Message> {
        let stored = Message {
            id: Uuid::new_v4(),
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            text: message.payload.text,
            image: message.payload.image,
            client_id: message.payload.client_id,
            created_at: Utc::now(),
            read_at: None,
        };
        self.messages.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn conversation(&self, user: Uuid, peer: Uuid) -> DbResult<Vec<Message>> {
        let messages = self.messages.read().await;
        Ok(messages
            .iter()
            .filter(|m| m.is_between(user, peer))
            .cloned()
            .collect())
    }

    async fn partner_ids(&self, user: Uuid) -> DbResult<Vec<Uuid>> {
        let messages = self.messages.read().await;
        let mut partners = Vec::new();
        for message in messages.iter().rev() {
            let partner = if message.sender_id == user {
                message.receiver_id
            } else if message.receiver_id == user {
                message.sender_id
            } else {
                continue;
            };
            if !partners.contains(&partner) {
                partners.push(partner);
            }
        }
        Ok(partners)
    }

    async fn unread_counts(&self, user: Uuid) -> DbResult<HashMap<Uuid, i64>> {
        let messages = self.messages.read().await;
        let mut counts = HashMap::new();
        for message in messages
            .iter()
            .filter(|m| m.receiver_id == user && !m.is_read())
        {
            *counts.entry(message.sender_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn mark_read(&self, user: Uuid, peer: Uuid) -> DbResult<u64> {
        let mut messages = self.messages.write().await;
        let now = Utc::now();
        let mut updated = 0;
        for message in messages
            .iter_mut()
            .filter(|m| m.receiver_id == user && m.sender_id == peer && !m.is_read())
        {
            message.read_at = Some(now);
            updated += 1;
        }
        Ok(updated)
    }
}

pub struct MemoryCollection<T> {
    documents: RwLock<Vec<Document<T>>>,
}

impl<T> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl<T: Resource> Collection<T> for MemoryCollection<T> {
    async fn list(&self) -> DbResult<Vec<Document<T>>> {
        // 与数据库实现一致，最新的在前
        Ok(self.documents.read().await.iter().rev().cloned().collect())
    }

    async fn get(&self, id: Uuid) -> DbResult<Option<Document<T>>> {
        let documents = self.documents.read().await;
        Ok(documents.iter().find(|d| d.id == id).cloned())
    }

    async fn insert(&self, body: T) -> DbResult<Document<T>> {
        let document = Document::new(body);
        self.documents.write().await.push(document.clone());
        Ok(document)
    }

    async fn replace(&self, id: Uuid, body: T) -> DbResult<Option<Document<T>>> {
        let mut documents = self.documents.write().await;
        Ok(documents.iter_mut().find(|d| d.id == id).map(|document| {
            document.body = body;
            document.updated_at = Utc::now();
            document.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|d| d.id != id);
        Ok(documents.len() != before)
    }
}
