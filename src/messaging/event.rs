use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Lifecycle events of a channel subscription
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectionEvent {
    /// Transport opened for the channel
    Connected { channel: String },

    /// Transport closed, by either side
    Disconnected(DisconnectReason),

    /// Transport failed to open or broke while open
    Error(ConnectionError),

    /// A new connection attempt is scheduled after `delay`
    Reconnecting { attempt: u32, delay: Duration },
}

impl ConnectionEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Disconnected(_) => "disconnected",
            Self::Error(_) => "error",
            Self::Reconnecting { .. } => "reconnecting",
        }
    }
}

impl fmt::Display for ConnectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected { channel } => write!(f, "connected to '{}'", channel),
            Self::Disconnected(reason) => write!(f, "disconnected: {}", reason),
            Self::Error(error) => write!(f, "error: {}", error),
            Self::Reconnecting { attempt, delay } => write!(
                f,
                "reconnecting in {}ms (attempt {})",
                delay.as_millis(),
                attempt
            ),
        }
    }
}

/// Reason for a disconnect event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisconnectReason {
    /// Human-readable description of why the connection closed.
    pub message: String,
    /// WebSocket close code, if available (e.g. 1000 = normal, 1006 = abnormal).
    pub code: Option<u16>,
    /// Whether the close was requested locally (teardown)
    pub initiated_locally: bool,
}

impl DisconnectReason {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            initiated_locally: false,
        }
    }

    pub fn with_code(message: impl Into<String>, code: u16) -> Self {
        Self {
            code: Some(code),
            ..Self::new(message)
        }
    }

    pub fn local(message: impl Into<String>) -> Self {
        Self {
            initiated_locally: true,
            ..Self::new(message)
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code: {})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Transport failure reported to consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionError {
    pub message: String,
    /// Whether the failure happened before the transport opened
    pub during_connect: bool,
}

impl ConnectionError {
    pub fn connect(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            during_connect: true,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            during_connect: false,
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
