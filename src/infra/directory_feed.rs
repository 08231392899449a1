use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::app::ports::{DirectoryFeedPort, RefreshTriggerPort};
use crate::config::DirectoryConfig;
use crate::constants::{DIRECTORY_FEED, REFRESH_FEED};
use crate::error::{MapError, Result};
use crate::infra::http_client::{build_client, endpoint, feed_error};
use crate::observability::metrics;
use crate::types::RawRecord;

/// HTTP adapter for the professional directory backend
/// (`GET /personas?postalCode=` and `POST /scrape?postalCode=`)
pub struct HttpDirectoryFeed {
    client: Client,
    base_url: String,
}

impl HttpDirectoryFeed {
    pub fn new(config: &DirectoryConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_seconds, None)?,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl DirectoryFeedPort for HttpDirectoryFeed {
    #[instrument(skip(self))]
    async fn fetch_records(&self, postal_code: &str) -> Result<Vec<RawRecord>> {
        let url = endpoint(&self.base_url, "personas");
        debug!("GET {}", url);

        let records: Vec<RawRecord> = self
            .client
            .get(&url)
            .query(&[("postalCode", postal_code)])
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(feed_error(DIRECTORY_FEED))?
            .json()
            .await
            .map_err(feed_error(DIRECTORY_FEED))?;

        metrics::feeds::request_succeeded(DIRECTORY_FEED, records.len());
        Ok(records)
    }
}

#[async_trait]
impl RefreshTriggerPort for HttpDirectoryFeed {
    #[instrument(skip(self))]
    async fn trigger_refresh(&self, postal_code: &str) -> Result<Value> {
        let url = endpoint(&self.base_url, "scrape");
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .query(&[("postalCode", postal_code)])
            .send()
            .await
            .map_err(feed_error(REFRESH_FEED))?;
        let status = resp.status();
        let body = resp.text().await.map_err(feed_error(REFRESH_FEED))?;

        match parse_refresh_reply(status, &body) {
            Ok(reply) => {
                metrics::feeds::request_succeeded(REFRESH_FEED, 1);
                Ok(reply)
            }
            Err(e) => {
                metrics::feeds::request_failed(REFRESH_FEED);
                Err(e)
            }
        }
    }
}

/// Failed scrapes usually still answer with an `{"error": ...}` body, which
/// carries a better message than the status line, so any JSON body is passed
/// on whatever the status.
fn parse_refresh_reply(status: StatusCode, body: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(reply) => Ok(reply),
        Err(_) if !status.is_success() => Err(MapError::feed_unavailable(REFRESH_FEED, format!("HTTP {}", status))),
        Err(e) => Err(MapError::feed_unavailable(REFRESH_FEED, format!("invalid JSON reply: {}", e))),
    }
}
