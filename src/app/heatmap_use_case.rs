use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::app::ports::MapPointFeedPort;
use crate::app::resolve_use_case::LocationResolver;
use crate::app::sequencer::{RequestSequencer, RequestToken};
use crate::config::MapConfig;
use crate::error::{MapError, Result};
use crate::observability::metrics;
use crate::pipeline::heat::{aggregate_with, samples_from_records, HeatLayerOptions};
use crate::types::{Coordinates, HeatPoint};

/// The density layer currently drawn on the map
#[derive(Debug, Clone, Serialize)]
pub struct HeatLayer {
    /// The location query this layer was loaded for
    pub label: String,
    pub points: Vec<HeatPoint>,
    pub options: HeatLayerOptions,
    pub refreshed_at: DateTime<Utc>,
}

/// Owned map state: the current view and at most one heat layer.
///
/// Whatever renders the map reads from here; only code holding `&mut`
/// can move the view or swap the layer.
#[derive(Debug, Clone, Serialize)]
pub struct MapSession {
    pub center: Coordinates,
    pub zoom: u8,
    heat_layer: Option<HeatLayer>,
}

impl MapSession {
    pub fn new(center: Coordinates, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            heat_layer: None,
        }
    }

    pub fn from_config(config: &MapConfig) -> Self {
        Self::new(config.default_center, config.default_zoom)
    }

    pub fn set_view(&mut self, center: Coordinates, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
    }

    pub fn heat_layer(&self) -> Option<&HeatLayer> {
        self.heat_layer.as_ref()
    }

    /// Drop the previous layer and install `layer`. Layers are never merged.
    pub fn replace_heat_layer(&mut self, layer: HeatLayer) -> Option<HeatLayer> {
        metrics::heatmap::layer_replaced(layer.points.len());
        self.heat_layer.replace(layer)
    }
}

impl Default for MapSession {
    fn default() -> Self {
        Self::from_config(&MapConfig::default())
    }
}

/// Result of one heatmap search, not yet applied to a session
#[derive(Debug, Clone)]
pub struct HeatmapUpdate {
    pub token: RequestToken,
    /// `None` when the location could not be geocoded; the view stays put
    pub center: Option<Coordinates>,
    pub layer: HeatLayer,
}

/// Location search for the map page: re-centers on the resolved location and
/// reloads the heat layer.
pub struct HeatmapSearch {
    resolver: LocationResolver,
    points: Arc<dyn MapPointFeedPort>,
    options: HeatLayerOptions,
    search_zoom: u8,
    sequencer: RequestSequencer,
}

impl HeatmapSearch {
    pub fn new(
        resolver: LocationResolver,
        points: Arc<dyn MapPointFeedPort>,
        options: HeatLayerOptions,
        search_zoom: u8,
    ) -> Self {
        Self {
            resolver,
            points,
            options,
            search_zoom,
            sequencer: RequestSequencer::new(),
        }
    }

    /// Resolve `location` and load fresh heat points.
    ///
    /// A location with no geocoding match still reloads the layer, leaving the
    /// view where it was. Blank input fails before any request is made.
    #[instrument(skip(self))]
    pub async fn search(&self, location: &str) -> Result<HeatmapUpdate> {
        let location = location.trim();
        if location.is_empty() {
            metrics::requests::rejected_empty_query("location");
            return Err(MapError::EmptyQuery { what: "location" });
        }
        let token = self.sequencer.issue();

        let center = self.resolver.resolve(location).await?;
        let records = self.points.fetch_points().await?;
        let samples = samples_from_records(&records);
        if samples.len() < records.len() {
            debug!("Skipped {} map records without coordinates", records.len() - samples.len());
        }
        let points = aggregate_with(&samples, self.options.default_intensity);
        info!("Showing professional density for {} ({} points)", location, points.len());

        Ok(HeatmapUpdate {
            token,
            center,
            layer: HeatLayer {
                label: location.to_string(),
                points,
                options: self.options.clone(),
                refreshed_at: Utc::now(),
            },
        })
    }

    /// Apply an update to the session unless a newer search has been issued.
    /// Returns whether the session changed.
    pub fn apply(&self, session: &mut MapSession, update: HeatmapUpdate) -> bool {
        if !self.sequencer.is_current(update.token) {
            metrics::requests::superseded("heatmap");
            debug!(token = update.token.value(), "Dropping superseded heatmap response");
            return false;
        }
        if let Some(center) = update.center {
            session.set_view(center, self.search_zoom);
        }
        session.replace_heat_layer(update.layer);
        true
    }

    /// Search and apply in one step.
    pub async fn search_into(&self, session: &mut MapSession, location: &str) -> Result<bool> {
        let update = self.search(location).await?;
        Ok(self.apply(session, update))
    }
}
