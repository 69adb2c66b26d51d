use thiserror::Error;

/// Errors that can occur when using the notification client.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// WebSocket protocol error (handshake failed, invalid frame, etc.)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid channel name
    #[error("Channel error: {0}")]
    Channel(String),

    /// Token store could not be read or written
    #[error("Token store error: {0}")]
    Token(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error (token persistence)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing error (malformed API base URL)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Connection attempt did not complete in time
    #[error("Timeout error")]
    Timeout,

    /// Attempted operation while not connected to the server
    #[error("Not connected")]
    NotConnected,
}

/// Convenience type alias for `Result<T, NotifyError>`.
pub type Result<T> = std::result::Result<T, NotifyError>;
