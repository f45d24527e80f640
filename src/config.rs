use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::ScreenSize;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub screen: ScreenConfig,
    pub tracking: TrackingConfig,
    pub pipeline: PipelineConfig,
    pub camera: CameraConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Publish frames where one or both eyes fell back to `NEUTRAL_ANCHOR`.
    pub accept_degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub frame_queue: usize,
    /// Drop frames that arrive while the worker is busy instead of blocking.
    pub drop_late: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Frames to capture before stopping. 0 runs until the source ends.
    pub frames: u64,
    pub access_granted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        // iPhone 13 / 14 portrait
        Self {
            width: 1170.0,
            height: 2532.0,
        }
    }
}

impl ScreenConfig {
    pub fn size(&self) -> ScreenSize {
        ScreenSize::new(self.width, self.height)
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            accept_degraded: true,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_queue: 1,
            drop_late: true,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
            frames: 300,
            access_granted: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "config.json";

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(Error::ConfigParse)
    }

    /// Loads the config at `path`. A missing file is created with defaults;
    /// an unparsable one is left untouched and defaults are used.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("Configuration file not found. Creating default at {}", path.display());
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        match Self::from_json_str(&content) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                // Rewrite so newly added fields show up in the file
                config.save(path)?;
                Ok(config)
            }
            Err(e) => {
                warn!("Error parsing config: {}. Loading defaults.", e);
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self).map_err(Error::ConfigParse)?;
        fs::write(path, content).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })
    }
}
