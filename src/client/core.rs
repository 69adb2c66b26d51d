use super::{NotificationClientBuilder, NotifyClientOptions};
use crate::infrastructure::build_channel_url;
use crate::messaging::MessageHandler;
use crate::subscription::{ChannelSubscription, SessionConfig};
use crate::token::TokenProvider;
use crate::types::{NotifyError, Result};
use std::sync::Arc;

/// Entry point for BookRider channel notifications.
///
/// The client holds configuration and the injected [`TokenProvider`]. Every
/// call to [`connect`](Self::connect) reads the current token and opens one
/// independent subscription for a single channel.
///
/// # Example
///
/// ```no_run
/// use bookrider_notify::{NotificationClient, NotifyClientOptions, StaticToken};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = NotificationClient::new(
///     NotifyClientOptions {
///         api_base_url: "https://api.bookrider.pl".to_string(),
///         ..Default::default()
///     },
///     StaticToken::new("access-token"),
/// )?;
///
/// if let Some(subscription) = client.connect("librarian/orders/pending", |payload| {
///     println!("New order received: {}", payload);
/// })? {
///     // ... later, when the view goes away
///     client.disconnect(subscription).await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NotificationClient {
    pub(crate) host: String,
    pub(crate) options: NotifyClientOptions,
    pub(crate) tokens: Arc<dyn TokenProvider>,
}

impl NotificationClient {
    /// Creates a client. No connection is made until [`connect`](Self::connect).
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Config`] when the options are invalid.
    pub fn new(options: NotifyClientOptions, tokens: impl TokenProvider + 'static) -> Result<Self> {
        NotificationClientBuilder::new(options, Arc::new(tokens)).map(|builder| builder.build())
    }

    /// Creates a client from `BOOKRIDER_*` environment variables.
    pub fn from_env(tokens: impl TokenProvider + 'static) -> Result<Self> {
        Self::new(NotifyClientOptions::from_env()?, tokens)
    }

    /// Subscribes to `channel`, calling `on_message` with every inbound payload.
    ///
    /// Returns `Ok(None)` without touching the network when no access token is
    /// available. Transport failures are not returned here; they are reported
    /// through [`ChannelSubscription::events`] and the log.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Channel`] for an empty channel name and
    /// [`NotifyError::UrlParse`] when the configured host is not a valid URL host.
    pub fn connect<F>(&self, channel: &str, on_message: F) -> Result<Option<ChannelSubscription>>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.connect_with_handler(channel, Arc::new(on_message))
    }

    /// Same as [`connect`](Self::connect) with a shared handler
    pub fn connect_with_handler(
        &self,
        channel: &str,
        handler: MessageHandler,
    ) -> Result<Option<ChannelSubscription>> {
        if channel.is_empty() {
            return Err(NotifyError::Channel(
                "channel name must not be empty".to_string(),
            ));
        }

        let Some(token) = self.tokens.access_token().filter(|t| !t.is_empty()) else {
            tracing::debug!(channel, "No access token available, skipping connection");
            return Ok(None);
        };

        let url = build_channel_url(&self.host, self.options.secure, &token, channel)?;
        let config = SessionConfig {
            channel: channel.to_string(),
            url,
            keepalive_interval: self.options.keepalive_interval(),
            connect_timeout: self.options.connect_timeout(),
            reconnect: self.options.reconnect.clone(),
        };

        Ok(Some(ChannelSubscription::start(
            config,
            handler,
            self.options.event_capacity(),
        )))
    }

    /// Tears a subscription down: stops its keep-alive and closes its transport.
    pub async fn disconnect(&self, subscription: ChannelSubscription) -> Result<()> {
        subscription.close().await
    }

    /// Host the connection URL is built from
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn options(&self) -> &NotifyClientOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockServer, test_options};
    use crate::token::{MemoryTokenStore, StaticToken};
    use std::time::Duration;

    #[tokio::test]
    async fn test_no_token_skips_connection() {
        let server = MockServer::start().await;
        let client = NotificationClient::new(test_options(&server), StaticToken::none()).unwrap();

        let subscription = client.connect("orders/pending", |_| {}).unwrap();
        assert!(subscription.is_none());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(server.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_token_counts_as_missing() {
        let server = MockServer::start().await;
        let store = MemoryTokenStore::new();
        store.set_access_token("");
        let client = NotificationClient::new(test_options(&server), store).unwrap();

        assert!(client.connect("orders/pending", |_| {}).unwrap().is_none());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(server.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_channel_rejected() {
        let client =
            NotificationClient::new(NotifyClientOptions::default(), StaticToken::new("T")).unwrap();
        assert!(matches!(
            client.connect("", |_| {}),
            Err(NotifyError::Channel(_))
        ));
    }

    #[tokio::test]
    async fn test_token_read_at_connect_time() {
        let mut server = MockServer::start().await;
        let store = Arc::new(MemoryTokenStore::new());
        let client = NotificationClient {
            host: server.host(),
            options: test_options(&server),
            tokens: Arc::clone(&store) as Arc<dyn TokenProvider>,
        };

        assert!(client.connect("a", |_| {}).unwrap().is_none());

        store.set_access_token("fresh");
        let subscription = client.connect("a", |_| {}).unwrap().unwrap();
        let uri = server.expect_connected().await.1;
        assert_eq!(uri, "/ws?token=fresh&channel=a");

        client.disconnect(subscription).await.unwrap();
    }
}
