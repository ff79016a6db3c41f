use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::models::{Message, MessagePayload, ProfileUpdate, User};
use crate::result::ApiResponse;
use crate::routes::auth::{AuthResponse, LoginRequest, SignupRequest};
use crate::routes::message::{MarkReadResponse, UnreadCounts};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// 服务端返回的业务错误，message 可直接展示
    #[error("{message}")]
    Api {
        status: u16,
        code: i32,
        message: String,
    },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api { status: 401, .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// 聊天客户端用到的服务端接口
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn check_auth(&self) -> ClientResult<User>;
    async fn signup(&self, req: &SignupRequest) -> ClientResult<AuthResponse>;
    async fn login(&self, req: &LoginRequest) -> ClientResult<AuthResponse>;
    async fn logout(&self) -> ClientResult<()>;
    async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<User>;

    async fn get_users(&self) -> ClientResult<Vec<User>>;
    async fn get_contacts(&self) -> ClientResult<Vec<User>>;
    async fn get_chat_partners(&self) -> ClientResult<Vec<User>>;
    async fn get_unread_counts(&self) -> ClientResult<UnreadCounts>;
    async fn get_messages(&self, peer: Uuid) -> ClientResult<Vec<Message>>;
    async fn send_message(&self, peer: Uuid, payload: &MessagePayload) -> ClientResult<Message>;
    async fn mark_messages_as_read(&self, peer: Uuid) -> ClientResult<u64>;
}

/// 基于 reqwest 的实现，登录后以 Bearer 头携带令牌
pub struct HttpChatApi {
    client: Client,
    base_url: String,
    token: Mutex<Option<String>>,
}

impl HttpChatApi {
    /// `base_url` 包含接口前缀，例如 `http://localhost:3000/api`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        }
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.set_token(Some(token.into()));
        self
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// 实时连接地址，http 换成 ws
    pub fn socket_url(&self) -> String {
        let base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.base_url.clone()
        };
        format!("{}/socket", base)
    }

    async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let mut builder = self
            .client
            .request(method.clone(), format!("{}{}", self.base_url, path));
        if let Some(token) = self.token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await.map_err(|e| {
            tracing::debug!("{} {} returned undecodable body ({})", method, path, status);
            ClientError::Decode(e.to_string())
        })?;

        into_result(status, envelope)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request::<(), T>(Method::GET, path, None).await
    }
}

fn into_result<T>(status: StatusCode, envelope: ApiResponse<T>) -> ClientResult<T> {
    if !status.is_success() || !envelope.is_success() {
        return Err(ClientError::Api {
            status: status.as_u16(),
            code: envelope.code,
            message: envelope.msg,
        });
    }
    envelope
        .resp_data
        .ok_or_else(|| ClientError::Decode("missing resp_data".to_string()))
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn check_auth(&self) -> ClientResult<User> {
        self.get("/auth/check").await
    }

    async fn signup(&self, req: &SignupRequest) -> ClientResult<AuthResponse> {
        let auth: AuthResponse = self
            .request(Method::POST, "/auth/signup", Some(req))
            .await?;
        self.set_token(Some(auth.token.clone()));
        Ok(auth)
    }

    async fn login(&self, req: &LoginRequest) -> ClientResult<AuthResponse> {
        let auth: AuthResponse = self.request(Method::POST, "/auth/login", Some(req)).await?;
        self.set_token(Some(auth.token.clone()));
        Ok(auth)
    }

    async fn logout(&self) -> ClientResult<()> {
        let result = self
            .request::<(), serde_json::Value>(Method::POST, "/auth/logout", None)
            .await;
        // 无论服务端是否成功都丢弃本地令牌
        self.set_token(None);
        result.map(|_| ())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<User> {
        self.request(Method::PUT, "/auth/update-profile", Some(update))
            .await
    }

    async fn get_users(&self) -> ClientResult<Vec<User>> {
        self.get("/users").await
    }

    async fn get_contacts(&self) -> ClientResult<Vec<User>> {
        self.get("/messages/contacts").await
    }

    async fn get_chat_partners(&self) -> ClientResult<Vec<User>> {
        self.get("/messages/chats").await
    }

    async fn get_unread_counts(&self) -> ClientResult<UnreadCounts> {
        self.get("/messages/unread/counts").await
    }

    async fn get_messages(&self, peer: Uuid) -> ClientResult<Vec<Message>> {
        self.get(&format!("/messages/{}", peer)).await
    }

    async fn send_message(&self, peer: Uuid, payload: &MessagePayload) -> ClientResult<Message> {
        self.request(Method::POST, &format!("/messages/send/{}", peer), Some(payload))
            .await
    }

    async fn mark_messages_as_read(&self, peer: Uuid) -> ClientResult<u64> {
        let res: MarkReadResponse = self
            .request::<(), _>(Method::PUT, &format!("/messages/mark-read/{}", peer), None)
            .await?;
        Ok(res.updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::error_codes;

    #[test]
    fn socket_url_switches_scheme() {
        assert_eq!(
            HttpChatApi::new("http://localhost:3000/api/").socket_url(),
            "ws://localhost:3000/api/socket"
        );
        assert_eq!(
            HttpChatApi::new("https://alumni.example.com/api").socket_url(),
            "wss://alumni.example.com/api/socket"
        );
    }

    #[test]
    fn restored_token_is_kept() {
        let api = HttpChatApi::new("http://localhost:3000/api").with_token("abc");
        assert_eq!(api.token().as_deref(), Some("abc"));
    }

    #[test]
    fn error_envelope_becomes_api_error() {
        let envelope = ApiResponse::<User>::error(error_codes::AUTH_FAILED, "Invalid credentials");
        let err = into_result(StatusCode::UNAUTHORIZED, envelope).unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn success_without_data_is_a_decode_error() {
        let envelope = ApiResponse::<u64> {
            code: error_codes::SUCCESS,
            msg: "success".into(),
            resp_data: None,
        };
        assert!(matches!(
            into_result(StatusCode::OK, envelope),
            Err(ClientError::Decode(_))
        ));
    }
}
