use super::ChannelSubscription;
use crate::client::NotificationClient;
use crate::messaging::MessageHandler;
use crate::types::Result;
use std::sync::Arc;

/// Per-view notification manager.
///
/// Activating on a channel opens a subscription; activating on a different
/// channel first tears the old one down; [`deactivate`](Self::deactivate) or
/// dropping the listener releases it for good. At most one subscription is
/// held at any time.
pub struct NotificationListener {
    client: NotificationClient,
    handler: MessageHandler,
    active: Option<ChannelSubscription>,
}

impl NotificationListener {
    pub fn new<F>(client: NotificationClient, on_message: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        Self {
            client,
            handler: Arc::new(on_message),
            active: None,
        }
    }

    /// Subscribes to `channel`, replacing any subscription to another channel.
    ///
    /// Re-activating the channel already held is a no-op. Without an access
    /// token the listener ends up inactive.
    pub async fn activate(&mut self, channel: &str) -> Result<()> {
        if self.channel() == Some(channel) {
            return Ok(());
        }

        self.deactivate().await;
        self.active = self
            .client
            .connect_with_handler(channel, Arc::clone(&self.handler))?;

        if self.active.is_some() {
            tracing::info!(channel, "Notification listener activated");
        }
        Ok(())
    }

    /// Releases the current subscription, if any
    pub async fn deactivate(&mut self) {
        let Some(subscription) = self.active.take() else {
            return;
        };

        let channel = subscription.channel().to_string();
        if let Err(e) = subscription.close().await {
            tracing::debug!(channel = %channel, "Error while closing subscription: {}", e);
        }
        tracing::info!(channel = %channel, "Notification listener deactivated");
    }

    pub fn channel(&self) -> Option<&str> {
        self.active.as_ref().map(ChannelSubscription::channel)
    }

    pub fn subscription(&self) -> Option<&ChannelSubscription> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}
