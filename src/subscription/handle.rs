use super::session::{Session, SessionConfig};
use crate::client::{ConnectionManager, ConnectionState};
use crate::messaging::{ConnectionEvent, DisconnectReason, MessageHandler};
use crate::types::Result;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// A live subscription to one notification channel.
///
/// Owns exactly one transport at a time. Call [`close`](Self::close) for an
/// orderly teardown; dropping the handle aborts the session without waiting
/// for the close handshake. Either way the keep-alive stops and the transport
/// is released.
pub struct ChannelSubscription {
    channel: String,
    connection: Arc<ConnectionManager>,
    events: broadcast::Sender<ConnectionEvent>,
    // Subscribed before the session starts, so no event can be missed by it
    first_events: Mutex<Option<broadcast::Receiver<ConnectionEvent>>>,
    session: Option<JoinHandle<()>>,
}

impl ChannelSubscription {
    pub(crate) fn start(config: SessionConfig, handler: MessageHandler, event_capacity: usize) -> Self {
        let channel = config.channel.clone();
        let connection = Arc::new(ConnectionManager::new());
        let (events, first_events) = broadcast::channel(event_capacity);

        let session = Session::new(config, Arc::clone(&connection), events.clone(), handler);
        let handle = tokio::spawn(session.run());

        tracing::debug!(channel = %channel, "Channel subscription started");

        Self {
            channel,
            connection,
            events,
            first_events: Mutex::new(Some(first_events)),
            session: Some(handle),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_open()
    }

    /// Whether the session task is still running (connected, connecting or
    /// waiting to reconnect)
    pub fn is_active(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Connection state watcher
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe()
    }

    /// Lifecycle events.
    ///
    /// The first receiver handed out sees every event since the subscription
    /// started (up to the buffer capacity). Later receivers only see events
    /// sent after they were created; use [`state`](Self::state) for the
    /// current state.
    pub fn events(&self) -> broadcast::Receiver<ConnectionEvent> {
        let first = self.first_events.lock().ok().and_then(|mut slot| slot.take());
        first.unwrap_or_else(|| self.events.subscribe())
    }

    /// Stops the keep-alive and closes the transport, whatever its state
    pub async fn close(mut self) -> Result<()> {
        self.teardown().await
    }

    async fn teardown(&mut self) -> Result<()> {
        let Some(handle) = self.session.take() else {
            return Ok(());
        };

        handle.abort();
        // Wait until the session, and with it the keep-alive, is gone
        let _ = handle.await;

        let result = self.connection.close().await;
        tracing::info!(channel = %self.channel, "Channel subscription closed");

        let _ = self
            .events
            .send(ConnectionEvent::Disconnected(DisconnectReason::local(
                "subscription closed",
            )));
        result
    }
}

impl Drop for ChannelSubscription {
    fn drop(&mut self) {
        if let Some(handle) = self.session.take() {
            handle.abort();
            // The session sets Closed again once its future is dropped
            self.connection.set_state(ConnectionState::Closed);
            tracing::debug!(channel = %self.channel, "Channel subscription dropped");
        }
    }
}

impl std::fmt::Debug for ChannelSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSubscription")
            .field("channel", &self.channel)
            .field("state", &self.state())
            .finish()
    }
}
