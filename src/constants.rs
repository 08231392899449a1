/// Shared constants for the persona pipeline and the map view.

// Normalization defaults
pub const UNKNOWN_NAME: &str = "Unknown";
pub const MAX_RATING: f64 = 5.0;

// Heat layer
pub const DEFAULT_INTENSITY: f64 = 0.5;
pub const MAX_INTENSITY: f64 = 2.5;
pub const HEAT_RADIUS: u32 = 20;
pub const HEAT_BLUR: u32 = 10;
pub const HEAT_MAX_ZOOM: u8 = 17;

// Map view (centered on India until a search re-centers it)
pub const DEFAULT_CENTER: (f64, f64) = (22.9734, 78.6569);
pub const DEFAULT_ZOOM: u8 = 5;
pub const SEARCH_ZOOM: u8 = 11;

/// Minimum-rating choices offered to users; 0 means any rating.
pub const RATING_THRESHOLDS: [f64; 5] = [0.0, 4.0, 4.5, 4.7, 4.8];

// Upstream endpoints
pub const DEFAULT_DIRECTORY_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_MAP_POINTS_URL: &str = "http://localhost:5000/api/map-locations";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = concat!("persona_map/", env!("CARGO_PKG_VERSION"));

// Feed names used in errors and metrics labels
pub const DIRECTORY_FEED: &str = "directory";
pub const REFRESH_FEED: &str = "refresh";
pub const MAP_POINTS_FEED: &str = "map_points";
pub const GEOCODER_FEED: &str = "geocoder";
