//! 客户端状态
//!
//! 会话状态和聊天状态以普通的 Rust 状态机表示，通过 [`ChatApi`] 访问 HTTP 接口，
//! 通过 [`SocketClient`] 接收实时事件。界面渲染不在此处。

mod api;
mod chat;
mod session;
mod socket;

pub use api::{ChatApi, ClientError, ClientResult, HttpChatApi};
pub use chat::{ChatEntry, ChatStore, ChatWindow, PendingSend};
pub use session::SessionStore;
pub use socket::SocketClient;

/// 需要展示给用户的提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Info(String),
    Error(String),
}

impl Notification {
    pub fn text(&self) -> &str {
        match self {
            Notification::Success(text) | Notification::Info(text) | Notification::Error(text) => {
                text
            }
        }
    }
}
