//! # BookRider Notify
//!
//! Real-time notification channel client for the BookRider library logistics
//! platform. Each subscription holds one WebSocket connection to a named push
//! channel (`librarian/orders/pending`, `administrator/library-requests`, ...),
//! keeps it alive with a periodic `ping` and hands every inbound payload to a
//! consumer callback.
//!
//! ## Example
//!
//! ```no_run
//! use bookrider_notify::{NotificationClient, NotificationListener, NotifyClientOptions, StaticToken};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NotificationClient::new(
//!         NotifyClientOptions {
//!             api_base_url: "https://api.bookrider.pl".to_string(),
//!             ..Default::default()
//!         },
//!         StaticToken::new("access-token"),
//!     )?;
//!
//!     let mut listener = NotificationListener::new(client, |payload| {
//!         println!("New order received: {}", payload);
//!     });
//!     listener.activate("librarian/orders/pending").await?;
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(60)).await;
//!     listener.deactivate().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod infrastructure;
pub mod messaging;
pub mod subscription;
pub mod token;
pub mod types;
pub mod websocket;

#[cfg(test)]
mod testing;

pub use client::{ConnectionState, NotificationClient, NotifyClientOptions};
pub use infrastructure::{BackoffConfig, ReconnectPolicy};
pub use messaging::{ConnectionError, ConnectionEvent, DisconnectReason, MessageHandler};
pub use subscription::{ChannelSubscription, NotificationListener};
pub use token::{EnvToken, FileTokenStore, MemoryTokenStore, StaticToken, TokenProvider};
pub use types::{NotifyError, Result, channels};
