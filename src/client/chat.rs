//! 聊天状态
//!
//! 会话窗口按 `Closed -> Opening(peer) -> Open(peer)` 切换。发送消息时先插入一条
//! 带关联 ID 的待确认记录，服务端确认后原地替换，失败则移除。实时推送的新消息
//! 如果来自当前打开的会话就直接追加并标记已读，否则累加未读数并提示。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::{ChatApi, ClientResult, Notification};
use crate::models::{Message, MessagePayload, User};
use crate::realtime::ServerEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatWindow {
    #[default]
    Closed,
    /// 正在加载与该用户的历史消息
    Opening(Uuid),
    Open(Uuid),
}

impl ChatWindow {
    pub fn peer(&self) -> Option<Uuid> {
        match self {
            ChatWindow::Closed => None,
            ChatWindow::Opening(peer) | ChatWindow::Open(peer) => Some(*peer),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub message: Message,
    /// 乐观插入、尚未被服务端确认
    pub pending: bool,
}

impl ChatEntry {
    fn confirmed(message: Message) -> Self {
        Self {
            message,
            pending: false,
        }
    }
}

/// 已插入本地、等待服务端确认的发送
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub peer: Uuid,
    pub client_id: Uuid,
    pub payload: MessagePayload,
}

pub struct ChatStore<A: ChatApi> {
    api: Arc<A>,
    me: Uuid,
    pub users: Vec<User>,
    pub contacts: Vec<User>,
    pub chats: Vec<User>,
    pub messages: Vec<ChatEntry>,
    pub unread_counts: HashMap<Uuid, i64>,
    pub selected_user: Option<User>,
    pub window: ChatWindow,
    pub is_users_loading: bool,
    pub is_messages_loading: bool,
    subscribed: bool,
    notifications: Vec<Notification>,
}

impl<A: ChatApi> ChatStore<A> {
    /// `me` 为当前登录用户
    pub fn new(api: Arc<A>, me: Uuid) -> Self {
        Self {
            api,
            me,
            users: Vec::new(),
            contacts: Vec::new(),
            chats: Vec::new(),
            messages: Vec::new(),
            unread_counts: HashMap::new(),
            selected_user: None,
            window: ChatWindow::Closed,
            is_users_loading: false,
            is_messages_loading: false,
            subscribed: false,
            notifications: Vec::new(),
        }
    }

    pub fn unread_count(&self, peer: Uuid) -> i64 {
        self.unread_counts.get(&peer).copied().unwrap_or(0)
    }

    pub async fn get_unread_counts(&mut self) {
        match self.api.get_unread_counts().await {
            Ok(counts) => self.unread_counts = counts,
            Err(e) => tracing::warn!("Failed to fetch unread counts: {}", e),
        }
    }

    pub async fn get_users(&mut self) {
        self.is_users_loading = true;
        match self.api.get_users().await {
            Ok(users) => {
                self.users = users;
                self.get_unread_counts().await;
            }
            Err(e) => self.notify_error(e.to_string()),
        }
        self.is_users_loading = false;
    }

    pub async fn get_all_contacts(&mut self) {
        self.is_users_loading = true;
        match self.api.get_contacts().await {
            Ok(contacts) => self.contacts = contacts,
            Err(e) => self.notify_error(e.to_string()),
        }
        self.is_users_loading = false;
    }

    pub async fn get_chat_partners(&mut self) {
        self.is_users_loading = true;
        match self.api.get_chat_partners().await {
            Ok(chats) => {
                self.chats = chats;
                self.get_unread_counts().await;
            }
            Err(e) => self.notify_error(e.to_string()),
        }
        self.is_users_loading = false;
    }

    /// 打开会话：加载历史后标记已读
    pub async fn open_chat(&mut self, peer: User) {
        let peer_id = peer.id;
        self.begin_open(peer);
        let history = self.api.get_messages(peer_id).await;
        if self.finish_open(peer_id, history) {
            self.mark_messages_as_read(peer_id).await;
        }
    }

    /// 切换到 Opening 并清空上一个会话的消息
    pub fn begin_open(&mut self, peer: User) {
        self.window = ChatWindow::Opening(peer.id);
        self.selected_user = Some(peer);
        self.messages.clear();
        self.is_messages_loading = true;
    }

    /// 历史加载完成。返回 false 表示期间已切换到别的会话或加载失败。
    pub fn finish_open(&mut self, peer: Uuid, history: ClientResult<Vec<Message>>) -> bool {
        if self.window != ChatWindow::Opening(peer) {
            return false;
        }
        self.is_messages_loading = false;

        match history {
            Ok(history) => {
                // 加载期间推送到的消息可能不在历史里
                let early = std::mem::take(&mut self.messages);
                self.messages = history.into_iter().map(ChatEntry::confirmed).collect();
                for entry in early {
                    if !self.contains(entry.message.id) {
                        self.messages.push(entry);
                    }
                }
                self.window = ChatWindow::Open(peer);
                true
            }
            Err(e) => {
                self.close_chat();
                self.notify_error(e.to_string());
                false
            }
        }
    }

    pub fn close_chat(&mut self) {
        self.window = ChatWindow::Closed;
        self.selected_user = None;
        self.messages.clear();
        self.is_messages_loading = false;
    }

    /// 本地未读数立即清零，再通知服务端
    pub async fn mark_messages_as_read(&mut self, peer: Uuid) {
        self.unread_counts.remove(&peer);
        if let Err(e) = self.api.mark_messages_as_read(peer).await {
            tracing::warn!("Failed to mark messages as read: {}", e);
        }
    }

    pub async fn send_message(&mut self, payload: MessagePayload) -> bool {
        let Some(pending) = self.begin_send(payload) else {
            return false;
        };
        let result = self.api.send_message(pending.peer, &pending.payload).await;
        self.complete_send(&pending, result)
    }

    /// 乐观插入一条待确认消息。没有打开的会话或内容为空时返回 None。
    pub fn begin_send(&mut self, payload: MessagePayload) -> Option<PendingSend> {
        let ChatWindow::Open(peer) = self.window else {
            self.notify_error("No conversation is open".to_string());
            return None;
        };
        let Some(mut payload) = payload.normalized() else {
            self.notify_error("Message must contain text or an image".to_string());
            return None;
        };

        let client_id = Uuid::new_v4();
        payload.client_id = Some(client_id);
        self.messages.push(ChatEntry {
            message: Message {
                id: client_id,
                sender_id: self.me,
                receiver_id: peer,
                text: payload.text.clone(),
                image: payload.image.clone(),
                client_id: Some(client_id),
                created_at: Utc::now(),
                read_at: None,
            },
            pending: true,
        });

        Some(PendingSend {
            peer,
            client_id,
            payload,
        })
    }

    /// 用服务端结果替换或撤销待确认消息
    pub fn complete_send(&mut self, pending: &PendingSend, result: ClientResult<Message>) -> bool {
        let index = self
            .messages
            .iter()
            .position(|e| e.pending && e.message.client_id == Some(pending.client_id));

        match result {
            Ok(message) => {
                match index {
                    Some(i) if !self.contains(message.id) => {
                        self.messages[i] = ChatEntry::confirmed(message);
                    }
                    Some(i) => {
                        self.messages.remove(i);
                    }
                    // 会话已切换，本地列表里没有这条消息
                    None => {}
                }
                true
            }
            Err(e) => {
                if let Some(i) = index {
                    self.messages.remove(i);
                }
                self.notify_error(e.to_string());
                false
            }
        }
    }

    pub fn subscribe_to_messages(&mut self) {
        self.subscribed = true;
    }

    pub fn unsubscribe_from_messages(&mut self) {
        self.subscribed = false;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// 处理实时事件；只关心发给自己的新消息
    pub async fn handle_event(&mut self, event: ServerEvent) {
        let ServerEvent::NewMessage(message) = event else {
            return;
        };
        if !self.subscribed || message.receiver_id != self.me {
            return;
        }

        let sender = message.sender_id;
        match self.window {
            ChatWindow::Open(peer) if peer == sender => {
                self.append(message);
                self.mark_messages_as_read(peer).await;
            }
            // 打开完成后统一标记已读
            ChatWindow::Opening(peer) if peer == sender => self.append(message),
            _ => {
                *self.unread_counts.entry(sender).or_insert(0) += 1;
                let name = self.display_name(sender);
                self.notifications
                    .push(Notification::Info(format!("New message from {}", name)));
            }
        }
    }

    /// 重连后重新拉取未读数和当前会话
    pub async fn resync(&mut self) {
        self.get_unread_counts().await;

        let ChatWindow::Open(peer) = self.window else {
            return;
        };
        match self.api.get_messages(peer).await {
            Ok(history) => {
                if self.window != ChatWindow::Open(peer) {
                    return;
                }
                let pending: Vec<ChatEntry> =
                    self.messages.drain(..).filter(|e| e.pending).collect();
                self.messages = history.into_iter().map(ChatEntry::confirmed).collect();
                self.messages.extend(pending);
                self.mark_messages_as_read(peer).await;
            }
            Err(e) => tracing::warn!("Failed to resync conversation: {}", e),
        }
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn contains(&self, id: Uuid) -> bool {
        self.messages.iter().any(|e| e.message.id == id)
    }

    fn append(&mut self, message: Message) {
        if !self.contains(message.id) {
            self.messages.push(ChatEntry::confirmed(message));
        }
    }

    fn display_name(&self, user_id: Uuid) -> String {
        self.users
            .iter()
            .chain(&self.chats)
            .chain(&self.contacts)
            .find(|u| u.id == user_id)
            .map(|u| u.full_name.clone())
            .unwrap_or_else(|| user_id.to_string())
    }

    fn notify_error(&mut self, message: String) {
        self.notifications.push(Notification::Error(message));
    }
}
