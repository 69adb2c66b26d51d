use crate::types::{NotifyError, Result};
use crate::websocket::WsStream;
use futures::SinkExt;
use futures::stream::SplitSink;
use tokio::sync::{RwLock, watch};
use tokio_tungstenite::tungstenite::{self, Message};

pub type WsWriter = SplitSink<WsStream, Message>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
    Errored,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Errored => "errored",
        }
    }
}

/// Owns the write half of the single live transport and its state
pub struct ConnectionManager {
    ws_write: RwLock<Option<WsWriter>>,
    state: watch::Sender<ConnectionState>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConnectionState::Closed);
        Self {
            ws_write: RwLock::new(None),
            state,
        }
    }

    /// Sets the WebSocket write sink (called after successful connection)
    pub async fn set_writer(&self, writer: WsWriter) {
        let mut ws = self.ws_write.write().await;
        *ws = Some(writer);
    }

    /// Gets the current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Sets the connection state, notifying watchers on change
    pub fn set_state(&self, new_state: ConnectionState) {
        let previous = self.state.send_replace(new_state);
        if previous != new_state {
            tracing::debug!(
                "Connection state {} -> {}",
                previous.as_str(),
                new_state.as_str()
            );
        }
    }

    /// Watch receiver for state changes
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Checks if currently open
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Sends a text frame through the WebSocket connection
    pub async fn send_text(&self, text: &str) -> Result<()> {
        let mut ws_guard = self.ws_write.write().await;
        match ws_guard.as_mut() {
            Some(ws) => {
                ws.send(Message::text(text.to_owned())).await?;
                Ok(())
            }
            None => Err(NotifyError::NotConnected),
        }
    }

    /// Closes the transport regardless of its current state.
    /// The state ends `Closed` even when the close handshake fails.
    pub async fn close(&self) -> Result<()> {
        let writer = self.ws_write.write().await.take();

        let result = match writer {
            Some(mut ws) => {
                self.set_state(ConnectionState::Closing);
                match ws.close().await {
                    Ok(())
                    | Err(tungstenite::Error::ConnectionClosed)
                    | Err(tungstenite::Error::AlreadyClosed) => Ok(()),
                    Err(e) => Err(e.into()),
                }
            }
            None => Ok(()),
        };

        self.set_state(ConnectionState::Closed);
        result
    }

    /// Drops the writer without a close handshake
    pub async fn clear_writer(&self) {
        let mut ws = self.ws_write.write().await;
        *ws = None;
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
