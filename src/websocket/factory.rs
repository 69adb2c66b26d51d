use crate::infrastructure::redacted;
use crate::types::{NotifyError, Result};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket factory for creating WebSocket connections
pub struct WebSocketFactory;

impl WebSocketFactory {
    /// Opens a WebSocket connection, failing after `timeout`
    pub async fn create(url: &Url, timeout: Duration) -> Result<WsStream> {
        tracing::debug!("Creating WebSocket connection to: {}", redacted(url));

        let (stream, response) = tokio::time::timeout(timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| NotifyError::Timeout)??;

        tracing::debug!("WebSocket handshake completed: {}", response.status());
        Ok(stream)
    }
}
