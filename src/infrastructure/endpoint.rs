use crate::types::{DEFAULT_HOST, Result, WS_PATH, query_params};
use url::Url;

const SCHEME_PREFIXES: [&str; 4] = ["https://", "http://", "wss://", "ws://"];

/// Strips any scheme and trailing slashes from an API base URL.
/// An empty base resolves to `localhost`.
pub fn normalize_host(api_base_url: &str) -> String {
    let trimmed = api_base_url.trim();
    let without_scheme = SCHEME_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);
    let host = without_scheme.trim_end_matches('/');

    if host.is_empty() {
        DEFAULT_HOST.to_string()
    } else {
        host.to_string()
    }
}

/// Builds `<scheme>://<host>/ws?token=..&channel=..` with encoded query values
pub fn build_channel_url(host: &str, secure: bool, token: &str, channel: &str) -> Result<Url> {
    let scheme = if secure { "wss" } else { "ws" };
    let mut url = Url::parse(&format!("{}://{}/{}", scheme, host, WS_PATH))?;

    url.query_pairs_mut()
        .append_pair(query_params::TOKEN, token)
        .append_pair(query_params::CHANNEL, channel);

    Ok(url)
}

/// Renders the URL for logs with the token value masked
pub fn redacted(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            if key == query_params::TOKEN {
                (key.into_owned(), "***".to_string())
            } else {
                (key.into_owned(), value.into_owned())
            }
        })
        .collect();

    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}
