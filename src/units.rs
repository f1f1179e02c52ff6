//! Unit conversion between meters and scene/display units
//!
//! One fixed scale per session. Physics quantities (gravity, telemetry) are
//! in meters; positions handed to and from the host are in display units.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{KM, METERS_TO_DISPLAY};
use crate::error::ConfigError;

/// Meters <-> display unit mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Units {
    meters_to_display: f32,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            meters_to_display: METERS_TO_DISPLAY,
        }
    }
}

impl Units {
    pub fn new(meters_to_display: f32) -> Result<Self, ConfigError> {
        if !meters_to_display.is_finite() || meters_to_display <= 0.0 {
            return Err(ConfigError::InvalidScale(meters_to_display));
        }
        Ok(Self { meters_to_display })
    }

    /// Display units per meter
    #[inline]
    pub fn scale(&self) -> f32 {
        self.meters_to_display
    }

    #[inline]
    pub fn to_display(&self, meters: Vec2) -> Vec2 {
        meters * self.meters_to_display
    }

    #[inline]
    pub fn to_meters(&self, display: Vec2) -> Vec2 {
        display / self.meters_to_display
    }

    #[inline]
    pub fn length_to_display(&self, meters: f32) -> f32 {
        meters * self.meters_to_display
    }

    #[inline]
    pub fn length_to_meters(&self, display: f32) -> f32 {
        display / self.meters_to_display
    }
}

#[inline]
pub fn km_to_meters(km: f32) -> f32 {
    km * KM
}

#[inline]
pub fn meters_to_km(meters: f32) -> f32 {
    meters / KM
}
