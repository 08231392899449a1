use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::app::ports::GeocoderPort;
use crate::error::{MapError, Result};
use crate::observability::metrics;
use crate::types::Coordinates;

/// Resolves a free-text location (postal code or address) to a coordinate
pub struct LocationResolver {
    geocoder: Arc<dyn GeocoderPort>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn GeocoderPort>) -> Self {
        Self { geocoder }
    }

    /// Resolve `query` to the geocoder's top-ranked match.
    ///
    /// Blank input fails with [`MapError::EmptyQuery`] before the geocoder is
    /// called. `Ok(None)` means the geocoder found nothing; the caller decides
    /// whether to keep its current view.
    #[instrument(skip(self))]
    pub async fn resolve(&self, query: &str) -> Result<Option<Coordinates>> {
        let query = query.trim();
        if query.is_empty() {
            metrics::requests::rejected_empty_query("location");
            return Err(MapError::EmptyQuery { what: "location" });
        }

        let matches = self.geocoder.search(query).await?;
        debug!("Geocoder returned {} matches", matches.len());

        match matches.into_iter().next() {
            Some(coordinates) => {
                metrics::geocoder::lookup_hit();
                info!(%coordinates, "Resolved location");
                Ok(Some(coordinates))
            }
            None => {
                metrics::geocoder::lookup_miss();
                info!("No geocoding match");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockGeocoder {
        matches: Vec<Coordinates>,
        calls: AtomicUsize,
    }

    impl MockGeocoder {
        fn new(matches: Vec<Coordinates>) -> Self {
            Self {
                matches,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GeocoderPort for MockGeocoder {
        async fn search(&self, _query: &str) -> Result<Vec<Coordinates>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.matches.clone())
        }
    }

    #[tokio::test]
    async fn test_empty_query_short_circuits() {
        let geocoder = Arc::new(MockGeocoder::new(vec![Coordinates::new(1.0, 2.0)]));
        let resolver = LocationResolver::new(geocoder.clone());

        for query in ["", "   ", "\t\n"] {
            let err = resolver.resolve(query).await.unwrap_err();
            assert!(matches!(err, MapError::EmptyQuery { .. }));
        }
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let geocoder = Arc::new(MockGeocoder::new(vec![
            Coordinates::new(12.97, 77.59),
            Coordinates::new(13.0, 80.2),
        ]));
        let resolver = LocationResolver::new(geocoder);

        let resolved = resolver.resolve("560038").await.unwrap();
        assert_eq!(resolved, Some(Coordinates::new(12.97, 77.59)));
    }

    #[tokio::test]
    async fn test_no_match_is_not_an_error() {
        let resolver = LocationResolver::new(Arc::new(MockGeocoder::new(Vec::new())));
        assert_eq!(resolver.resolve("nowhere at all").await.unwrap(), None);
    }

    struct FailingGeocoder;

    #[async_trait]
    impl GeocoderPort for FailingGeocoder {
        async fn search(&self, _query: &str) -> Result<Vec<Coordinates>> {
            Err(MapError::feed_unavailable("geocoder", "connection refused"))
        }
    }

    #[tokio::test]
    async fn test_geocoder_failure_is_surfaced() {
        let resolver = LocationResolver::new(Arc::new(FailingGeocoder));
        let err = resolver.resolve("Mumbai").await.unwrap_err();
        assert!(matches!(err, MapError::FeedUnavailable { feed: "geocoder", .. }));
    }
}
