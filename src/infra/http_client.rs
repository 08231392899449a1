use reqwest::Client;
use std::time::Duration;

use crate::constants::DEFAULT_USER_AGENT;
use crate::error::{MapError, Result};
use crate::observability::metrics;

/// Shared client construction for the upstream feeds
pub fn build_client(timeout_seconds: u64, user_agent: Option<&str>) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
        .gzip(true)
        .build()
        .map_err(MapError::from)
}

/// Wrap a transport/status/decode failure as an unavailable feed and count it.
pub(crate) fn feed_error(feed: &'static str) -> impl Fn(reqwest::Error) -> MapError {
    move |e| {
        metrics::feeds::request_failed(feed);
        MapError::feed_unavailable(feed, e.to_string())
    }
}

/// Join a base URL and a path without doubling or dropping the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
