// Infrastructure module - Background services and utilities
pub mod endpoint;
pub mod heartbeat;
pub mod timer;

pub use endpoint::{build_channel_url, normalize_host, redacted};
pub use heartbeat::KeepAlive;
pub use timer::{BackoffConfig, ReconnectPolicy, Timer};
