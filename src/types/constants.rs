/// Path of the push endpoint on the API host
pub const WS_PATH: &str = "ws";

/// Query parameter names carried on the connection URL
pub mod query_params {
    pub const TOKEN: &str = "token";
    pub const CHANNEL: &str = "channel";
}

/// Well-known notification channels published by the BookRider backend
pub mod channels {
    /// New library registration submissions (system administrator)
    pub const LIBRARY_REQUESTS: &str = "administrator/library-requests";
    /// New driver applications (system administrator)
    pub const DRIVER_APPLICATIONS: &str = "administrator/driver-applications";
    /// New pending orders (librarian)
    pub const LIBRARIAN_PENDING_ORDERS: &str = "librarian/orders/pending";
}

/// Environment variables read by `NotifyClientOptions::from_env`
pub mod env_vars {
    pub const API_BASE_URL: &str = "BOOKRIDER_API_BASE_URL";
    pub const API_BASE_URL_FALLBACK: &str = "VITE_API_BASE_URL";
    pub const WS_SECURE: &str = "BOOKRIDER_WS_SECURE";
    pub const KEEPALIVE_MS: &str = "BOOKRIDER_KEEPALIVE_MS";
    pub const CONNECT_TIMEOUT_MS: &str = "BOOKRIDER_CONNECT_TIMEOUT_MS";
    pub const ACCESS_TOKEN: &str = "BOOKRIDER_ACCESS_TOKEN";
}

/// Storage key the access token is persisted under
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Host used when no API base URL is configured
pub const DEFAULT_HOST: &str = "localhost";

/// Text frame sent as the keep-alive signal
pub const KEEPALIVE_MESSAGE: &str = "ping";

/// Default keep-alive interval (milliseconds)
pub const DEFAULT_KEEPALIVE_INTERVAL: u64 = 30000;

/// Default connect timeout (milliseconds)
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10000;

/// Default reconnect backoff bounds (milliseconds)
pub const DEFAULT_RECONNECT_INITIAL: u64 = 1000;
pub const DEFAULT_RECONNECT_MAX: u64 = 30000;

/// Capacity of the per-subscription connection event buffer
pub const DEFAULT_EVENT_CAPACITY: usize = 64;
