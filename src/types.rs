use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::MAX_RATING;
use crate::pipeline::processing::classify::classify;

/// Raw professional record as returned from an upstream feed
pub type RawRecord = serde_json::Value;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Canonical professional categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Architect,
    Designer,
    Photographer,
    Influencer,
    Furnishing,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Architect,
        Category::Designer,
        Category::Photographer,
        Category::Influencer,
        Category::Furnishing,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Architect => "architect",
            Category::Designer => "designer",
            Category::Photographer => "photographer",
            Category::Influencer => "influencer",
            Category::Furnishing => "furnishing",
            Category::Other => "other",
        }
    }

    /// Plural heading shown above a filtered list
    pub fn heading(&self) -> &'static str {
        match self {
            Category::Architect => "Architects",
            Category::Designer => "Designers",
            Category::Photographer => "Photographers",
            Category::Influencer => "Influencers",
            Category::Furnishing => "Furnishing Shops",
            Category::Other => "Others",
        }
    }

    /// Legend color used for map markers, where one is assigned
    pub fn map_color(&self) -> Option<&'static str> {
        match self {
            Category::Architect => Some("blue"),
            Category::Designer => Some("purple"),
            Category::Photographer => Some("green"),
            Category::Furnishing => Some("orange"),
            Category::Influencer | Category::Other => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// Any label is accepted and classified, so pre-normalized and raw upstream
// categories both land on a canonical variant.
impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(classify(&label))
    }
}

/// Canonical representation of one professional record after normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub category: Category,
    #[serde(default, deserialize_with = "deserialize_rating")]
    pub rating: f64,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub review_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Persona {
    /// A pin for this persona, if it can be placed on the map
    pub fn map_pin(&self) -> Option<MapPin> {
        self.coordinates.map(|coordinates| MapPin {
            persona_id: self.id.clone(),
            name: self.name.clone(),
            category: self.category,
            location: self.location.clone(),
            coordinates,
        })
    }
}

// Ratings from outside the normalizer are held to the same [0, MAX_RATING] range.
fn deserialize_rating<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let rating = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    if rating.is_nan() {
        return Ok(0.0);
    }
    Ok(rating.clamp(0.0, MAX_RATING))
}

/// Marker data for a persona with known coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPin {
    pub persona_id: String,
    pub name: String,
    pub category: Category,
    pub location: String,
    pub coordinates: Coordinates,
}

/// Category selection for the persona filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn heading(&self) -> &'static str {
        match self {
            CategoryFilter::All => "All Professionals",
            CategoryFilter::Only(category) => category.heading(),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if wanted == "all" {
            return Ok(CategoryFilter::All);
        }
        Category::ALL
            .iter()
            .find(|c| c.as_str() == wanted)
            .map(|c| CategoryFilter::Only(*c))
            .ok_or_else(|| {
                format!(
                    "unknown category '{}', expected all, {}",
                    s,
                    Category::ALL.map(|c| c.as_str()).join(", ")
                )
            })
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.pad("all"),
            CategoryFilter::Only(category) => fmt::Display::fmt(category, f),
        }
    }
}

/// The pair (selected category, minimum rating) applied to a persona collection
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterState {
    pub category: CategoryFilter,
    /// 0 means unconstrained
    pub min_rating: f64,
}

impl FilterState {
    pub fn new(category: CategoryFilter, min_rating: f64) -> Self {
        Self {
            category,
            min_rating,
        }
    }
}

/// One geo-tagged input to the heat aggregator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoSample {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub intensity: Option<f64>,
}

impl GeoSample {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            intensity: None,
        }
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = Some(intensity);
        self
    }
}

/// A coordinate plus intensity value feeding a density visualization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    pub intensity: f64,
}

impl HeatPoint {
    /// `[lat, lng, intensity]`, the shape heat layer renderers consume
    pub fn as_triple(&self) -> [f64; 3] {
        [self.lat, self.lng, self.intensity]
    }
}
