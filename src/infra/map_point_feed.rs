use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::app::ports::MapPointFeedPort;
use crate::config::MapPointsConfig;
use crate::constants::MAP_POINTS_FEED;
use crate::error::Result;
use crate::infra::http_client::{build_client, feed_error};
use crate::observability::metrics;
use crate::types::RawRecord;

/// HTTP adapter for the map-locations feed (JSON array of `{lat, lng, intensity?}`)
pub struct HttpMapPointFeed {
    client: Client,
    url: String,
}

impl HttpMapPointFeed {
    pub fn new(config: &MapPointsConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_seconds, None)?,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl MapPointFeedPort for HttpMapPointFeed {
    #[instrument(skip(self))]
    async fn fetch_points(&self) -> Result<Vec<RawRecord>> {
        debug!("GET {}", self.url);

        let points: Vec<RawRecord> = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(feed_error(MAP_POINTS_FEED))?
            .json()
            .await
            .map_err(feed_error(MAP_POINTS_FEED))?;

        metrics::feeds::request_succeeded(MAP_POINTS_FEED, points.len());
        Ok(points)
    }
}
