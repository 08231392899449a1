use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{
    DEFAULT_CENTER, DEFAULT_DIRECTORY_URL, DEFAULT_GEOCODER_URL, DEFAULT_MAP_POINTS_URL, DEFAULT_USER_AGENT,
    DEFAULT_ZOOM, SEARCH_ZOOM,
};
use crate::error::{MapError, Result};
use crate::pipeline::heat::HeatLayerOptions;
use crate::types::Coordinates;

pub const DEFAULT_CONFIG_PATH: &str = "persona_map.toml";
pub const CONFIG_PATH_ENV: &str = "PERSONA_MAP_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub directory: DirectoryConfig,
    pub map_points: MapPointsConfig,
    pub geocoder: GeocoderConfig,
    pub heatmap: HeatLayerOptions,
    pub map: MapConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DIRECTORY_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapPointsConfig {
    pub url: String,
    pub timeout_seconds: u64,
}

impl Default for MapPointsConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_MAP_POINTS_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Nominatim rejects requests without an identifying user agent
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub default_center: Coordinates,
    pub default_zoom: u8,
    /// Zoom applied after a location search re-centers the map
    pub search_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center: Coordinates::from(DEFAULT_CENTER),
            default_zoom: DEFAULT_ZOOM,
            search_zoom: SEARCH_ZOOM,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset
    pub filter: String,
    /// Write a daily-rolled log file in addition to the console
    pub file: bool,
    pub dir: PathBuf,
    pub file_name: String,
    /// JSON lines in the file instead of the console format
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "persona_map=info".to_string(),
            file: true,
            dir: PathBuf::from("logs"),
            file_name: "persona_map.log".to_string(),
            json: true,
        }
    }
}

impl Config {
    /// Load from `PERSONA_MAP_CONFIG` (or `persona_map.toml`), then apply
    /// environment overrides. A missing default file yields the defaults;
    /// a missing file named explicitly is an error.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Like [`Config::load`], but an explicit `path` takes precedence over
    /// `PERSONA_MAP_CONFIG`. Environment overrides apply either way.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let config = match (path, std::env::var(CONFIG_PATH_ENV)) {
            (Some(path), _) => Self::from_file(path)?,
            (None, Ok(path)) => Self::from_file(&path)?,
            (None, Err(_)) if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH)?,
            (None, Err(_)) => {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
                Self::default()
            }
        };

        Ok(config.with_env_overrides())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| MapError::Config(format!("Failed to read config file '{}': {}", path.display(), e)))?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("PERSONA_MAP_DIRECTORY_URL") {
            self.directory.base_url = url;
        }
        if let Ok(url) = std::env::var("PERSONA_MAP_POINTS_URL") {
            self.map_points.url = url;
        }
        if let Ok(url) = std::env::var("PERSONA_MAP_GEOCODER_URL") {
            self.geocoder.base_url = url;
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.heatmap.max.is_nan() || self.heatmap.max <= 0.0 {
            return Err(MapError::Config("heatmap.max must be positive".to_string()));
        }
        if self.heatmap.default_intensity <= 0.0 || self.heatmap.default_intensity > self.heatmap.max {
            return Err(MapError::Config(format!(
                "heatmap.default_intensity must be in (0, {}]",
                self.heatmap.max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.directory.base_url, DEFAULT_DIRECTORY_URL);
        assert_eq!(config.heatmap, HeatLayerOptions::default());
        assert_eq!(config.map.search_zoom, SEARCH_ZOOM);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
            [directory]
            base_url = "http://directory.internal:8000"

            [heatmap]
            radius = 30
            max = 5.0

            [map]
            default_center = { lat = 12.97, lng = 77.59 }
            "#,
        )
        .unwrap();

        assert_eq!(config.directory.base_url, "http://directory.internal:8000");
        assert_eq!(config.directory.timeout_seconds, 30);
        assert_eq!(config.heatmap.radius, 30);
        assert_eq!(config.heatmap.max, 5.0);
        assert_eq!(config.heatmap.blur, 10);
        assert_eq!(config.map.default_center, Coordinates::new(12.97, 77.59));
        assert_eq!(config.map.default_zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn test_logging_section() {
        let config = Config::from_toml("[logging]\nfilter = \"persona_map=debug\"\njson = false").unwrap();
        assert_eq!(config.logging.filter, "persona_map=debug");
        assert!(!config.logging.json);
        assert!(config.logging.file);
        assert_eq!(config.logging.dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_invalid_heatmap_rejected() {
        let err = Config::from_toml("[heatmap]\ndefault_intensity = 4.0").unwrap_err();
        assert!(matches!(err, MapError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[geocoder]\nuser_agent = \"test-agent\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.geocoder.user_agent, "test-agent");
        assert_eq!(config.geocoder.base_url, DEFAULT_GEOCODER_URL);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, MapError::Config(_)));
    }

    #[test]
    fn test_env_overrides_apply_to_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[map_points]\nurl = \"http://from-file/api/map-locations\"").unwrap();

        std::env::set_var("PERSONA_MAP_POINTS_URL", "http://from-env/api/map-locations");
        let config = Config::load_from(Some(file.path()));
        std::env::remove_var("PERSONA_MAP_POINTS_URL");

        let config = config.unwrap();
        assert_eq!(config.map_points.url, "http://from-env/api/map-locations");
        assert_eq!(config.directory.base_url, DEFAULT_DIRECTORY_URL);
    }
}
