//! Session configuration
//!
//! Fixed at session start and handed to each component's constructor. Loaded
//! from JSON; any missing field falls back to its default.

use std::f32::consts::FRAC_PI_8;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{
    METERS_TO_DISPLAY, MOON_RADIUS_KM, MOON_SURFACE_GRAVITY, TOUCH_ROTATION_SCALAR,
};
use crate::error::ConfigError;
use crate::sim::craft::CraftSpec;
use crate::sim::scenario::Scenario;
use crate::sim::scroll::{ParallaxBackground, Viewport};
use crate::sim::steering::{SteeringMode, build_adapter};
use crate::sim::world::World;
use crate::units::Units;

/// Top-level session settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub world: WorldSettings,
    pub display: DisplaySettings,
    pub scroll: ScrollSettings,
    pub steering: SteeringSettings,
    pub craft: CraftSpec,
    pub scenario: ScenarioSettings,
}

/// Celestial body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Radius (km)
    pub radius_km: f32,
    /// Surface gravity (m/s², negative = toward center)
    pub surface_gravity: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            radius_km: MOON_RADIUS_KM,
            surface_gravity: MOON_SURFACE_GRAVITY,
        }
    }
}

/// Scene scale and visible area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Display units per meter
    pub meters_to_display: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            meters_to_display: METERS_TO_DISPLAY,
            viewport_width: 1334.0,
            viewport_height: 750.0,
        }
    }
}

/// Parallax background
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSettings {
    pub rows: usize,
    pub cols: usize,
    /// Tile side length (display units). Defaults to the viewport height.
    pub tile_size: Option<f32>,
    /// Fraction of camera movement applied to the far layer
    pub ratio_mid: f32,
    /// Fraction of camera movement applied to the near layer
    pub ratio_close: f32,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 3,
            tile_size: None,
            ratio_mid: 0.25,
            ratio_close: 0.5,
        }
    }
}

/// Steering adapter selection and tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringSettings {
    pub mode: SteeringMode,
    /// Yaw/rate dead zone (radians or rad/s)
    pub dead_zone: f32,
    /// Yaw/rate scale
    pub sensitivity: f32,
    /// Upper bound on one frame's rotation (radians)
    pub max_rotation_per_frame: f32,
    /// Added to every gyro rate (rad/s)
    pub gyro_offset: f32,
    /// Run gyro rates through a high-pass filter
    pub high_pass: bool,
    /// Newest-sample weight of the high-pass filter's low-pass average
    pub filtering_factor: f32,
    /// Touch dead zone (fraction of zone height)
    pub touch_dead_zone: f32,
    /// Radians per full-zone-height drag
    pub touch_sensitivity: f32,
}

impl Default for SteeringSettings {
    fn default() -> Self {
        Self {
            mode: SteeringMode::Rate,
            dead_zone: 0.01,
            sensitivity: 0.1,
            max_rotation_per_frame: FRAC_PI_8,
            gyro_offset: 0.0,
            high_pass: false,
            filtering_factor: 0.1,
            touch_dead_zone: 0.0,
            touch_sensitivity: DisplaySettings::default().viewport_height / TOUCH_ROTATION_SCALAR,
        }
    }
}

/// Starting condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioSettings {
    /// Catalog name (`orbit`, `hover`)
    pub name: String,
    /// Replaces the scenario's starting impulse when set
    pub initial_impulse_override: Option<f32>,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            name: "orbit".to_string(),
            initial_impulse_override: None,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::ParseError)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::SerializeError)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let settings = Self::from_json(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Build every component once to surface configuration errors up front
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world()?;
        self.units()?;
        self.background()?;
        build_adapter(&self.steering)?;
        self.craft.validate()?;
        self.scenario()?;
        Ok(())
    }

    pub fn world(&self) -> Result<World, ConfigError> {
        World::new(self.world.radius_km, self.world.surface_gravity)
    }

    pub fn units(&self) -> Result<Units, ConfigError> {
        Units::new(self.display.meters_to_display)
    }

    pub fn viewport(&self) -> Result<Viewport, ConfigError> {
        Viewport::new(self.display.viewport_width, self.display.viewport_height)
    }

    /// Configured tile side, or the viewport height
    pub fn tile_size(&self) -> f32 {
        self.scroll
            .tile_size
            .unwrap_or(self.display.viewport_height)
    }

    pub fn background(&self) -> Result<ParallaxBackground, ConfigError> {
        ParallaxBackground::new(
            self.scroll.rows,
            self.scroll.cols,
            self.tile_size(),
            self.viewport()?,
            self.scroll.ratio_mid,
            self.scroll.ratio_close,
        )
    }

    /// Catalog scenario with any impulse override applied
    pub fn scenario(&self) -> Result<Scenario, ConfigError> {
        let scenario = Scenario::by_name(&self.scenario.name)?;
        match self.scenario.initial_impulse_override {
            Some(impulse) if !impulse.is_finite() => Err(ConfigError::InvalidCraft {
                name: "initial_impulse_override",
                value: impulse,
            }),
            Some(impulse) => Ok(scenario.with_impulse(impulse)),
            None => Ok(scenario),
        }
    }
}
