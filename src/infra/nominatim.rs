use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::app::ports::GeocoderPort;
use crate::config::GeocoderConfig;
use crate::constants::GEOCODER_FEED;
use crate::error::Result;
use crate::infra::http_client::{build_client, endpoint, feed_error};
use crate::observability::metrics;
use crate::types::Coordinates;

/// One search hit; Nominatim encodes coordinates as strings
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl Place {
    fn coordinates(&self) -> Option<Coordinates> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lng = self.lon.trim().parse::<f64>().ok()?;
        Some(Coordinates::new(lat, lng))
    }
}

/// Geocoder backed by the OpenStreetMap Nominatim search API
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_seconds, Some(config.user_agent.as_str()))?,
            base_url: config.base_url.clone(),
        })
    }
}

/// Keep provider order; drop hits whose coordinates do not parse.
fn to_coordinates(places: &[Place]) -> Vec<Coordinates> {
    places
        .iter()
        .filter_map(|place| {
            let coordinates = place.coordinates();
            if coordinates.is_none() {
                warn!("Skipping geocoder hit with unparsable coordinates: {:?}", place.display_name);
            }
            coordinates
        })
        .collect()
}

#[async_trait]
impl GeocoderPort for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<Coordinates>> {
        let url = endpoint(&self.base_url, "search");

        let places: Vec<Place> = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("q", query)])
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(feed_error(GEOCODER_FEED))?
            .json()
            .await
            .map_err(feed_error(GEOCODER_FEED))?;

        debug!("Nominatim returned {} places", places.len());
        metrics::feeds::request_succeeded(GEOCODER_FEED, places.len());
        Ok(to_coordinates(&places))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nominatim_reply() {
        let body = r#"[
            {"place_id": 1, "lat": "12.9716", "lon": "77.5946", "display_name": "Bengaluru"},
            {"place_id": 2, "lat": "bogus", "lon": "77.0"},
            {"place_id": 3, "lat": "13.0827", "lon": "80.2707", "display_name": "Chennai"}
        ]"#;

        let places: Vec<Place> = serde_json::from_str(body).unwrap();
        let coordinates = to_coordinates(&places);

        assert_eq!(
            coordinates,
            vec![Coordinates::new(12.9716, 77.5946), Coordinates::new(13.0827, 80.2707)]
        );
    }
}
