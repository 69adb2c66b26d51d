use crate::client::{ConnectionManager, ConnectionState};
use crate::infrastructure::{KeepAlive, ReconnectPolicy, Timer};
use crate::messaging::{
    ConnectionError, ConnectionEvent, Dispatch, DisconnectReason, FrameDispatcher, MessageHandler,
};
use crate::websocket::{WebSocketFactory, WsStream};
use futures::stream::{SplitStream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use url::Url;

/// Everything a session needs to (re)open its channel connection
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub channel: String,
    pub url: Url,
    pub keepalive_interval: Duration,
    pub connect_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

/// Background task driving one channel subscription.
///
/// Connect, read loop and keep-alive all run inside this task, so aborting it
/// releases the timer and the read half together.
pub(crate) struct Session {
    config: SessionConfig,
    connection: Arc<ConnectionManager>,
    events: broadcast::Sender<ConnectionEvent>,
    dispatcher: FrameDispatcher,
}

impl Session {
    pub(crate) fn new(
        config: SessionConfig,
        connection: Arc<ConnectionManager>,
        events: broadcast::Sender<ConnectionEvent>,
        handler: MessageHandler,
    ) -> Self {
        let dispatcher = FrameDispatcher::new(config.channel.clone(), handler);
        Self {
            config,
            connection,
            events,
            dispatcher,
        }
    }

    pub(crate) async fn run(self) {
        let mut cancelled = ClosedOnCancel {
            connection: Arc::clone(&self.connection),
            armed: true,
        };
        let mut timer = Timer::new(self.config.reconnect.clone());

        loop {
            self.connection.set_state(ConnectionState::Connecting);

            match WebSocketFactory::create(&self.config.url, self.config.connect_timeout).await {
                Ok(stream) => {
                    timer.reset();
                    self.serve(stream).await;
                }
                Err(e) => {
                    tracing::error!(channel = %self.config.channel, "Connection failed: {}", e);
                    self.connection.set_state(ConnectionState::Errored);
                    self.emit(ConnectionEvent::Error(ConnectionError::connect(e.to_string())));
                }
            }

            let Some(delay) = timer.next_delay() else {
                break;
            };
            let attempt = timer.attempts();
            tracing::info!(
                channel = %self.config.channel,
                "Attempting reconnection in {}ms (attempt {})",
                delay.as_millis(),
                attempt
            );
            self.emit(ConnectionEvent::Reconnecting { attempt, delay });
            tokio::time::sleep(delay).await;
        }

        cancelled.armed = false;
        tracing::debug!(channel = %self.config.channel, "Session finished");
    }

    /// Runs one open connection until it closes
    async fn serve(&self, stream: WsStream) {
        let (write_half, read_half) = stream.split();
        self.connection.set_writer(write_half).await;
        self.connection.set_state(ConnectionState::Open);

        tracing::info!(channel = %self.config.channel, "Channel connection opened");
        self.emit(ConnectionEvent::Connected {
            channel: self.config.channel.clone(),
        });

        let keepalive = KeepAlive::new(Arc::downgrade(&self.connection))
            .with_interval(self.config.keepalive_interval);

        // Dropping the keep-alive future here clears its timer.
        let reason = tokio::select! {
            reason = self.read_loop(read_half) => reason,
            () = keepalive.run() => DisconnectReason::new("connection dropped"),
        };

        if self.connection.state() == ConnectionState::Errored {
            self.connection.clear_writer().await;
        } else if let Err(e) = self.connection.close().await {
            tracing::debug!(channel = %self.config.channel, "Close after disconnect failed: {}", e);
        }

        tracing::warn!(channel = %self.config.channel, "Channel connection closed: {}", reason);
        self.emit(ConnectionEvent::Disconnected(reason));
    }

    async fn read_loop(&self, mut read_half: SplitStream<WsStream>) -> DisconnectReason {
        while let Some(msg_result) = read_half.next().await {
            match msg_result {
                Ok(msg) => {
                    if let Dispatch::Closed(reason) = self.dispatcher.dispatch(msg) {
                        return reason;
                    }
                }
                Err(e) => {
                    tracing::error!(channel = %self.config.channel, "WebSocket read error: {}", e);
                    self.connection.set_state(ConnectionState::Errored);
                    self.emit(ConnectionEvent::Error(ConnectionError::transport(
                        e.to_string(),
                    )));
                    return DisconnectReason::new(format!("transport error: {}", e));
                }
            }
        }

        DisconnectReason::new("connection dropped")
    }

    fn emit(&self, event: ConnectionEvent) {
        // No receivers is fine: events are optional for consumers
        let _ = self.events.send(event);
    }
}

/// Marks the connection `Closed` when the session future is dropped before it
/// finished, which is how an aborted task ends.
struct ClosedOnCancel {
    connection: Arc<ConnectionManager>,
    armed: bool,
}

impl Drop for ClosedOnCancel {
    fn drop(&mut self) {
        if self.armed {
            self.connection.set_state(ConnectionState::Closed);
        }
    }
}
