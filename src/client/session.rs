use std::collections::BTreeSet;
use std::sync::Arc;

use uuid::Uuid;

use super::{ChatApi, Notification};
use crate::models::{ProfileUpdate, User};
use crate::realtime::ServerEvent;
use crate::routes::auth::{LoginRequest, SignupRequest};

/// 登录状态和在线用户
pub struct SessionStore<A: ChatApi> {
    api: Arc<A>,
    pub auth_user: Option<User>,
    pub online_users: BTreeSet<Uuid>,
    pub is_checking_auth: bool,
    pub is_signing_up: bool,
    pub is_logging_in: bool,
    pub is_updating_profile: bool,
    notifications: Vec<Notification>,
}

impl<A: ChatApi> SessionStore<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            auth_user: None,
            online_users: BTreeSet::new(),
            is_checking_auth: true,
            is_signing_up: false,
            is_logging_in: false,
            is_updating_profile: false,
            notifications: Vec::new(),
        }
    }

    /// 恢复已有会话；未登录不算错误，不产生提示
    pub async fn check_auth(&mut self) {
        self.is_checking_auth = true;
        match self.api.check_auth().await {
            Ok(user) => self.auth_user = Some(user),
            Err(e) => {
                if !e.is_unauthorized() {
                    tracing::warn!("Error in auth check: {}", e);
                }
                self.auth_user = None;
            }
        }
        self.is_checking_auth = false;
    }

    pub async fn signup(&mut self, req: SignupRequest) -> bool {
        self.is_signing_up = true;
        let result = self.api.signup(&req).await;
        self.is_signing_up = false;

        match result {
            Ok(auth) => {
                self.auth_user = Some(auth.user);
                self.notify(Notification::Success("Account created successfully!".into()));
                true
            }
            Err(e) => {
                self.notify(Notification::Error(e.to_string()));
                false
            }
        }
    }

    pub async fn login(&mut self, req: LoginRequest) -> bool {
        self.is_logging_in = true;
        let result = self.api.login(&req).await;
        self.is_logging_in = false;

        match result {
            Ok(auth) => {
                self.auth_user = Some(auth.user);
                self.notify(Notification::Success("Logged in successfully".into()));
                true
            }
            Err(e) => {
                self.notify(Notification::Error(e.to_string()));
                false
            }
        }
    }

    /// 本地状态总是清空，服务端失败只提示
    pub async fn logout(&mut self) {
        if let Err(e) = self.api.logout().await {
            self.notify(Notification::Error(e.to_string()));
        } else {
            self.notify(Notification::Success("Logged out successfully".into()));
        }
        self.auth_user = None;
        self.online_users.clear();
    }

    pub async fn update_profile(&mut self, update: ProfileUpdate) -> bool {
        self.is_updating_profile = true;
        let result = self.api.update_profile(&update).await;
        self.is_updating_profile = false;

        match result {
            Ok(user) => {
                self.auth_user = Some(user);
                self.notify(Notification::Success("Profile updated successfully".into()));
                true
            }
            Err(e) => {
                self.notify(Notification::Error(e.to_string()));
                false
            }
        }
    }

    /// 处理在线状态事件：快照整体替换，上下线增量修改
    pub fn apply_event(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::OnlineUsers(users) => {
                self.online_users = users.iter().copied().collect();
            }
            ServerEvent::UserOnline { user_id } => {
                self.online_users.insert(*user_id);
            }
            ServerEvent::UserOffline { user_id } => {
                self.online_users.remove(user_id);
            }
            ServerEvent::NewMessage(_) => {}
        }
    }

    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.online_users.contains(&user_id)
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}
