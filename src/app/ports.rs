use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Coordinates, RawRecord};

/// Professional directory feed, scoped by postal code
#[async_trait]
pub trait DirectoryFeedPort: Send + Sync {
    async fn fetch_records(&self, postal_code: &str) -> Result<Vec<RawRecord>>;
}

/// Asks the upstream source to rescan and repopulate its store for a postal code.
/// The body is returned as-is; interpreting an `error` member is up to the caller.
#[async_trait]
pub trait RefreshTriggerPort: Send + Sync {
    async fn trigger_refresh(&self, postal_code: &str) -> Result<serde_json::Value>;
}

/// Feed of geo-tagged records for the heatmap
#[async_trait]
pub trait MapPointFeedPort: Send + Sync {
    async fn fetch_points(&self) -> Result<Vec<RawRecord>>;
}

/// Free-text geocoding; matches come back in the provider's relevance order
#[async_trait]
pub trait GeocoderPort: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Coordinates>>;
}
