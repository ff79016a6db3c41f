use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message as WsMessage,
};

use super::{ClientError, ClientResult};
use crate::realtime::ServerEvent;

/// 实时连接，产出服务端推送的事件
pub struct SocketClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl SocketClient {
    /// 令牌通过查询参数传递，`url` 形如 `ws://host/api/socket`
    pub async fn connect(url: &str, token: &str) -> ClientResult<Self> {
        let (stream, _) = connect_async(format!("{}?token={}", url, token))
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        tracing::debug!("Socket connected to {}", url);
        Ok(Self { stream })
    }

    /// 下一个事件；连接关闭时返回 None
    pub async fn next_event(&mut self) -> Option<ClientResult<ServerEvent>> {
        while let Some(frame) = self.stream.next().await {
            match frame {
                Ok(WsMessage::Text(text)) => {
                    return Some(
                        serde_json::from_str(text.as_str())
                            .map_err(|e| ClientError::Decode(e.to_string())),
                    );
                }
                Ok(WsMessage::Close(_)) => return None,
                // ping/pong 由 tungstenite 处理
                Ok(_) => continue,
                Err(e) => return Some(Err(ClientError::Transport(e.to_string()))),
            }
        }
        None
    }

    pub async fn close(mut self) -> ClientResult<()> {
        self.stream
            .send(WsMessage::Close(None))
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))
    }
}
