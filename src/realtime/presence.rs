//! 在线状态登记表
//!
//! 以连接 ID 为主键保存所有实时连接，并按用户建立二级索引。一个用户可以同时
//! 拥有多个连接（多个标签页或设备），只要还有一个连接存活就视为在线。
//! 断开时按连接 ID 删除，旧连接的延迟断开不会影响同一用户的新连接。
//!
//! 登记表只存在于进程内存中，重启后全部清空。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use uuid::Uuid;

use super::ServerEvent;

pub type ConnectionId = Uuid;

struct Connection {
    user_id: Uuid,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

#[derive(Default)]
struct Inner {
    connections: HashMap<ConnectionId, Connection>,
    /// 用户的连接，按建立顺序排列
    by_user: HashMap<Uuid, Vec<ConnectionId>>,
}

impl Inner {
    fn broadcast_except(&self, skip: ConnectionId, event: &ServerEvent) {
        for (id, connection) in &self.connections {
            if *id != skip {
                let _ = connection.tx.send(event.clone());
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct PresenceRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 登记一个已认证的连接，返回连接 ID 和该连接的事件队列。
    ///
    /// 新连接会先收到在线用户快照；如果这是该用户唯一的连接，其他连接会收到
    /// `UserOnline` 事件。
    pub fn register_connection(
        &self,
        user_id: Uuid,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = Uuid::new_v4();

        let mut inner = self.lock();
        inner
            .connections
            .insert(connection_id, Connection { user_id, tx });
        let user_connections = inner.by_user.entry(user_id).or_default();
        user_connections.push(connection_id);
        let first = user_connections.len() == 1;

        let mut online: Vec<Uuid> = inner.by_user.keys().copied().collect();
        online.sort();
        if let Some(connection) = inner.connections.get(&connection_id) {
            let _ = connection.tx.send(ServerEvent::OnlineUsers(online));
        }
        if first {
            inner.broadcast_except(connection_id, &ServerEvent::UserOnline { user_id });
        }

        tracing::debug!(
            "Registered connection {} for user {} ({} live connections)",
            connection_id,
            user_id,
            inner.connections.len()
        );
        (connection_id, rx)
    }

    /// 注销连接。返回 true 表示该用户因此下线。
    pub fn unregister_connection(&self, connection_id: ConnectionId) -> bool {
        let mut inner = self.lock();
        let Some(connection) = inner.connections.remove(&connection_id) else {
            return false;
        };
        let user_id = connection.user_id;

        let offline = match inner.by_user.get_mut(&user_id) {
            Some(ids) => {
                ids.retain(|id| *id != connection_id);
                ids.is_empty()
            }
            None => true,
        };
        if offline {
            inner.by_user.remove(&user_id);
            inner.broadcast_except(connection_id, &ServerEvent::UserOffline { user_id });
        }

        tracing::debug!(
            "Unregistered connection {} for user {} (offline: {})",
            connection_id,
            user_id,
            offline
        );
        offline
    }

    /// 用户最近建立的连接
    pub fn lookup_connection(&self, user_id: Uuid) -> Option<ConnectionId> {
        self.lock()
            .by_user
            .get(&user_id)
            .and_then(|ids| ids.last().copied())
    }

    pub fn connections_of(&self, user_id: Uuid) -> Vec<ConnectionId> {
        self.lock().by_user.get(&user_id).cloned().unwrap_or_default()
    }

    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.lock().by_user.contains_key(&user_id)
    }

    pub fn online_users(&self) -> Vec<Uuid> {
        let mut online: Vec<Uuid> = self.lock().by_user.keys().copied().collect();
        online.sort();
        online
    }

    pub fn connection_count(&self) -> usize {
        self.lock().connections.len()
    }

    /// 推送给用户的所有连接，返回成功入队的连接数。
    ///
    /// 尽力投递：不确认、不重试，已关闭的队列直接跳过。
    pub fn send_to_user(&self, user_id: Uuid, event: &ServerEvent) -> usize {
        let inner = self.lock();
        let Some(ids) = inner.by_user.get(&user_id) else {
            return 0;
        };
        ids.iter()
            .filter_map(|id| inner.connections.get(id))
            .filter(|connection| connection.tx.send(event.clone()).is_ok())
            .count()
    }
}
