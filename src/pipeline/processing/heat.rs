use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_INTENSITY, HEAT_BLUR, HEAT_MAX_ZOOM, HEAT_RADIUS, MAX_INTENSITY};
use crate::pipeline::processing::normalize::fields::first_number;
use crate::types::{GeoSample, HeatPoint, RawRecord};

/// Turn geo samples into heat points using the standard 0.5 default intensity.
pub fn aggregate(samples: &[GeoSample]) -> Vec<HeatPoint> {
    aggregate_with(samples, DEFAULT_INTENSITY)
}

/// Turn geo samples into heat points, substituting `default_intensity` for
/// samples whose intensity is missing, zero, or NaN.
///
/// One point per sample, in input order. Coincident samples are not merged;
/// the renderer blends them. Intensities are passed through unscaled, in the
/// same domain as [`HeatLayerOptions::max`].
pub fn aggregate_with(samples: &[GeoSample], default_intensity: f64) -> Vec<HeatPoint> {
    samples
        .iter()
        .map(|sample| HeatPoint {
            lat: sample.lat,
            lng: sample.lng,
            intensity: sample
                .intensity
                .filter(|i| *i != 0.0 && !i.is_nan())
                .unwrap_or(default_intensity),
        })
        .collect()
}

/// Read `{lat, lng, intensity?}` samples out of untyped feed records.
/// Records without usable coordinates cannot be placed and are skipped.
pub fn samples_from_records(records: &[RawRecord]) -> Vec<GeoSample> {
    records
        .iter()
        .filter_map(|record| {
            let lat = first_number(record, &["lat", "latitude"])?;
            let lng = first_number(record, &["lng", "lon", "longitude"])?;
            Some(GeoSample {
                lat,
                lng,
                intensity: first_number(record, &["intensity"]),
            })
        })
        .collect()
}

/// Rendering parameters handed to the heat layer alongside the points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatLayerOptions {
    pub radius: u32,
    pub blur: u32,
    pub max_zoom: u8,
    /// Intensity that renders at full color
    pub max: f64,
    /// Substituted for samples without an intensity
    pub default_intensity: f64,
    /// Color stops keyed by the fraction of `max`
    pub gradient: Vec<GradientStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub at: f64,
    pub color: String,
}

impl Default for HeatLayerOptions {
    fn default() -> Self {
        let stop = |at: f64, color: &str| GradientStop {
            at,
            color: color.to_string(),
        };
        Self {
            radius: HEAT_RADIUS,
            blur: HEAT_BLUR,
            max_zoom: HEAT_MAX_ZOOM,
            max: MAX_INTENSITY,
            default_intensity: DEFAULT_INTENSITY,
            gradient: vec![
                stop(0.0, "blue"),
                stop(0.4, "green"),
                stop(0.7, "orange"),
                stop(1.0, "red"),
            ],
        }
    }
}

impl HeatLayerOptions {
    /// Position of an intensity on the gradient, 0.0 to 1.0
    pub fn gradient_position(&self, intensity: f64) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (intensity / self.max).clamp(0.0, 1.0)
    }

    /// Color of the highest stop at or below the intensity's gradient position
    pub fn color_for(&self, intensity: f64) -> Option<&str> {
        let position = self.gradient_position(intensity);
        self.gradient
            .iter()
            .filter(|stop| stop.at <= position)
            .last()
            .map(|stop| stop.color.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_intensity_and_no_merge() {
        let samples = vec![GeoSample::new(10.0, 20.0), GeoSample::new(10.0, 20.0).with_intensity(1.0)];

        let points = aggregate(&samples);

        assert_eq!(
            points,
            vec![
                HeatPoint { lat: 10.0, lng: 20.0, intensity: 0.5 },
                HeatPoint { lat: 10.0, lng: 20.0, intensity: 1.0 },
            ]
        );
    }

    #[test]
    fn test_falsy_intensities_get_default() {
        let samples = vec![
            GeoSample::new(1.0, 1.0).with_intensity(0.0),
            GeoSample::new(2.0, 2.0).with_intensity(f64::NAN),
            GeoSample::new(3.0, 3.0).with_intensity(2.5),
        ];

        let intensities: Vec<f64> = aggregate(&samples).iter().map(|p| p.intensity).collect();

        assert_eq!(intensities, vec![0.5, 0.5, 2.5]);
    }

    #[test]
    fn test_intensity_is_not_rescaled() {
        let samples = vec![GeoSample::new(0.0, 0.0).with_intensity(7.0)];
        assert_eq!(aggregate(&samples)[0].intensity, 7.0);
    }

    #[test]
    fn test_aggregate_with_custom_default() {
        let points = aggregate_with(&[GeoSample::new(5.0, 5.0)], 1.25);
        assert_eq!(points[0].intensity, 1.25);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let samples: Vec<GeoSample> = (0..20)
            .map(|i| {
                let sample = GeoSample::new(i as f64, -(i as f64));
                if i % 3 == 0 { sample } else { sample.with_intensity(i as f64 / 10.0) }
            })
            .collect();
        assert_eq!(aggregate(&samples), aggregate(&samples));
        assert_eq!(aggregate(&samples).len(), samples.len());
    }

    #[test]
    fn test_samples_from_records() {
        let records = vec![
            json!({ "lat": 12.9, "lng": 77.6 }),
            json!({ "lat": "19.0", "lng": "72.8", "intensity": 1.5 }),
            json!({ "name": "no coordinates" }),
            json!({ "latitude": 28.6, "longitude": 77.2 }),
        ];

        let samples = samples_from_records(&records);

        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0], GeoSample::new(12.9, 77.6));
        assert_eq!(samples[1], GeoSample::new(19.0, 72.8).with_intensity(1.5));
        assert_eq!(samples[2], GeoSample::new(28.6, 77.2));
    }

    #[test]
    fn test_gradient_colors() {
        let options = HeatLayerOptions::default();
        assert_eq!(options.color_for(0.5), Some("blue"));
        assert_eq!(options.color_for(1.0), Some("green"));
        assert_eq!(options.color_for(2.0), Some("orange"));
        assert_eq!(options.color_for(9.0), Some("red"));
    }
}
