use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use time::macros::date;
use time::Date;

use crate::error::{Error, Result};
use crate::smoothing::SMOOTHING_WINDOW;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the simulation RNG. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Drawing surface width in pixels.
    pub canvas_width: f32,
    /// Drawing surface height in pixels. The plant is rooted on this edge.
    pub canvas_height: f32,
    /// Day the real plant was potted; plant age counts from its midnight UTC.
    pub planting_date: Date,
    /// Length of the root segment created on reset.
    pub initial_stem_height: f32,
    /// Thickness of the root segment created on reset.
    pub initial_thickness: f32,
    /// Readings averaged per sensor channel.
    pub smoothing_window: usize,
    /// Hard cap on stem segments.
    pub max_segments: usize,
    pub default_soil_moisture: f64,
    pub default_oxygen: f64,
    pub default_heart_rate: f64,
    /// Soil moisture restored by the reset command.
    pub reset_soil_moisture: f64,
    /// Soil moisture added by one watering gesture.
    pub watering_amount: f64,
    /// Upper bound watering can push soil moisture to.
    pub watering_cap: f64,
    pub auto_growth: bool,
    pub show_debug: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            canvas_width: 800.0,
            canvas_height: 600.0,
            planting_date: date!(2025 - 11 - 11),
            initial_stem_height: 100.0,
            initial_thickness: 12.0,
            smoothing_window: SMOOTHING_WINDOW,
            max_segments: 150,
            default_soil_moisture: 600.0,
            default_oxygen: 350.0,
            default_heart_rate: 0.0,
            reset_soil_moisture: 650.0,
            watering_amount: 100.0,
            watering_cap: 800.0,
            auto_growth: true,
            show_debug: true,
        }
    }
}

impl SimConfig {
    /// Reads and validates a JSON config. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SimConfig =
            serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.smoothing_window == 0 {
            return Err(Error::InvalidConfig(
                "smoothing_window must be at least 1".into(),
            ));
        }
        if self.max_segments == 0 {
            return Err(Error::InvalidConfig("max_segments must be at least 1".into()));
        }
        if !(self.initial_thickness > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "initial_thickness must be positive, got {}",
                self.initial_thickness
            )));
        }
        if !(self.initial_stem_height > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "initial_stem_height must be positive, got {}",
                self.initial_stem_height
            )));
        }
        Ok(())
    }
}
