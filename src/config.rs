use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub view: ViewConfig,
    pub camera: CameraConfig,
    pub viewport: ViewportConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub geography: PathBuf, // GeoJSON or Shapefile
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            geography: PathBuf::from("data/kenya-counties.geojson"),
        }
    }
}

/// Overview camera position, the one the map opens on and returns to when the popup closes.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64, // metres
    pub heading: f64, // degrees
    pub pitch: f64,
    pub roll: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            longitude: 37.9062,
            latitude: 0.0236,
            height: 2_000_000.0,
            heading: 0.0,
            pitch: 0.0,
            roll: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub fly_duration: f64,
    pub load_duration: f64,
    pub fit_padding_ratio: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fly_duration: 1.5,
            load_duration: 2.0,
            fit_padding_ratio: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Like `load_from_file`, but a missing file means "use the defaults".
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!(?path, "config file not found, using defaults");
            Ok(Self::default())
        }
    }
}
