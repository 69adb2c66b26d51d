use crate::client::ConnectionManager;
use crate::types::{DEFAULT_KEEPALIVE_INTERVAL, KEEPALIVE_MESSAGE};
use std::sync::Weak;
use std::time::Duration;
use tokio::time::{self, Instant};

/// Periodic keep-alive signal for one open connection.
///
/// The first ping goes out one full interval after `run` starts; a tick
/// that finds the connection not open sends nothing.
pub struct KeepAlive {
    interval: Duration,
    connection: Weak<ConnectionManager>,
}

impl KeepAlive {
    pub fn new(connection: Weak<ConnectionManager>) -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_KEEPALIVE_INTERVAL),
            connection,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs until the connection is dropped. Cancel by dropping the future.
    pub async fn run(self) {
        let mut interval_timer = time::interval_at(Instant::now() + self.interval, self.interval);
        interval_timer.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

        loop {
            interval_timer.tick().await;

            let Some(connection) = self.connection.upgrade() else {
                break;
            };

            if !connection.is_open() {
                continue;
            }

            match connection.send_text(KEEPALIVE_MESSAGE).await {
                Ok(()) => tracing::debug!("Sent keep-alive ping"),
                Err(e) => tracing::error!("[KeepAlive] Failed to send: {}", e),
            }
        }
    }
}
