// Module declarations
mod handle;
mod listener;
mod session;

// Public API exports
pub use handle::ChannelSubscription;
pub use listener::NotificationListener;
pub(crate) use session::SessionConfig;
