// Module declarations
mod builder;
mod connection;
mod core;

// Public API exports
pub use builder::{NotificationClientBuilder, NotifyClientOptions};
pub use connection::{ConnectionManager, ConnectionState, WsWriter};
pub use self::core::NotificationClient;
