use super::NotificationClient;
use crate::infrastructure::{ReconnectPolicy, normalize_host};
use crate::token::TokenProvider;
use crate::types::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_EVENT_CAPACITY, DEFAULT_HOST, DEFAULT_KEEPALIVE_INTERVAL,
    NotifyError, Result, env_vars,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct NotifyClientOptions {
    /// API base URL; any scheme prefix is stripped
    pub api_base_url: String,
    /// `wss` when true, `ws` otherwise
    pub secure: bool,
    /// Keep-alive interval in milliseconds
    pub keepalive_interval: Option<u64>,
    /// Connect timeout in milliseconds
    pub connect_timeout: Option<u64>,
    pub reconnect: ReconnectPolicy,
    pub event_capacity: Option<usize>,
}

impl Default for NotifyClientOptions {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_HOST.to_string(),
            secure: true,
            keepalive_interval: None,
            connect_timeout: None,
            reconnect: ReconnectPolicy::Never,
            event_capacity: None,
        }
    }
}

impl NotifyClientOptions {
    /// Reads options from `BOOKRIDER_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();

        if let Some(base) =
            read_var(env_vars::API_BASE_URL).or_else(|| read_var(env_vars::API_BASE_URL_FALLBACK))
        {
            options.api_base_url = base;
        }
        if let Some(secure) = parse_var::<bool>(env_vars::WS_SECURE)? {
            options.secure = secure;
        }
        options.keepalive_interval = parse_var(env_vars::KEEPALIVE_MS)?;
        options.connect_timeout = parse_var(env_vars::CONNECT_TIMEOUT_MS)?;

        Ok(options)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_millis(self.keepalive_interval.unwrap_or(DEFAULT_KEEPALIVE_INTERVAL))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
    }

    pub fn event_capacity(&self) -> usize {
        self.event_capacity.unwrap_or(DEFAULT_EVENT_CAPACITY)
    }

    fn validate(&self) -> Result<()> {
        if self.keepalive_interval == Some(0) {
            return Err(NotifyError::Config(
                "keep-alive interval must be greater than zero".to_string(),
            ));
        }
        if self.connect_timeout == Some(0) {
            return Err(NotifyError::Config(
                "connect timeout must be greater than zero".to_string(),
            ));
        }
        if self.event_capacity == Some(0) {
            return Err(NotifyError::Config(
                "event capacity must be greater than zero".to_string(),
            ));
        }
        self.reconnect.validate()
    }
}

fn read_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match read_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| NotifyError::Config(format!("invalid value for {}: {}", name, e))),
        None => Ok(None),
    }
}

/// Builder for NotificationClient that validates options up front
pub struct NotificationClientBuilder {
    options: NotifyClientOptions,
    tokens: Arc<dyn TokenProvider>,
}

impl NotificationClientBuilder {
    pub fn new(options: NotifyClientOptions, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        options.validate()?;
        Ok(Self { options, tokens })
    }

    pub fn build(self) -> NotificationClient {
        let host = normalize_host(&self.options.api_base_url);
        tracing::debug!("Notification client configured for host {}", host);

        NotificationClient {
            host,
            options: self.options,
            tokens: self.tokens,
        }
    }
}
