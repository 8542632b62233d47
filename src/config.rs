use std::path::PathBuf;
use std::time::Duration;
use std::{fs, sync::RwLock};

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::CaptureError;
use crate::sequence::VALID_EXTENSIONS;

/// Intervals beyond a week make the duration math pointless; reject them.
const MAX_INTERVAL_SECS: f64 = 604_800.0;

/// Operator-facing capture settings. Read once per decision point during a
/// session; replacing them is only allowed while no session runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Seconds between capture attempts (e.g. 60 = a photo every minute).
    pub interval_secs: f64,
    /// Minimum mean lightness in [0, 1] a frame must exceed to be kept.
    /// 0 disables gating.
    pub brightness_threshold: f32,
    /// Burn the capture time into each frame before gating and saving.
    pub overlay_timestamp: bool,
    pub image_folder: PathBuf,
    pub image_name_prefix: String,
    pub image_extension: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5.0,
            brightness_threshold: 0.0,
            overlay_timestamp: true,
            image_folder: PathBuf::from("img"),
            image_name_prefix: "image".into(),
            image_extension: "jpg".into(),
        }
    }
}

impl CaptureConfig {
    /// Checks every field the session start path depends on.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if !self.interval_secs.is_finite() || self.interval_secs <= 0.0 {
            return Err(CaptureError::InvalidConfig(format!(
                "interval must be a positive number of seconds, got {}",
                self.interval_secs
            )));
        }
        if self.interval_secs > MAX_INTERVAL_SECS {
            return Err(CaptureError::InvalidConfig(format!(
                "interval must be at most {MAX_INTERVAL_SECS} seconds, got {}",
                self.interval_secs
            )));
        }
        if !(0.0..=1.0).contains(&self.brightness_threshold) {
            return Err(CaptureError::InvalidConfig(format!(
                "brightness threshold must be within [0, 1], got {}",
                self.brightness_threshold
            )));
        }
        if !VALID_EXTENSIONS.contains(&self.image_extension.as_str()) {
            return Err(CaptureError::InvalidConfig(format!(
                "image extension must be one of {VALID_EXTENSIONS:?}, got '{}'",
                self.image_extension
            )));
        }
        if self.image_folder.as_os_str().is_empty() {
            return Err(CaptureError::InvalidConfig(
                "image folder must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }

    /// The scheduling step as a chrono duration, for trigger-time math.
    pub(crate) fn interval_step(&self) -> chrono::Duration {
        chrono::Duration::milliseconds((self.interval_secs * 1000.0).round() as i64)
    }
}

/// JSON-backed store for the capture config: load-or-default on open,
/// write-through on update.
pub struct ConfigStore {
    path: PathBuf,
    data: RwLock<CaptureConfig>,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!(
                        "Could not parse config at {}, using defaults: {err}",
                        path.display()
                    );
                    CaptureConfig::default()
                }
            }
        } else {
            CaptureConfig::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn current(&self) -> CaptureConfig {
        self.data.read().unwrap().clone()
    }

    /// Validates and persists a new config.
    pub fn update(&self, config: CaptureConfig) -> Result<()> {
        config.validate()?;
        let serialized = serde_json::to_string_pretty(&config)?;
        let mut guard = self.data.write().unwrap();
        fs::write(&self.path, &serialized)
            .with_context(|| format!("Failed to write config to {}", self.path.display()))?;
        *guard = config;
        Ok(())
    }
}
