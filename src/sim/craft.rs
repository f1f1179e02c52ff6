//! Craft data exchanged with the host physics engine
//!
//! The host owns the rigid bodies and joints. This side only sees a plain
//! snapshot of the craft and turns throttle/engine state into a force.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{LANDER_DEFAULT_THROTTLE, LANDER_MAX_THRUST};
use crate::error::ConfigError;

/// Per-frame craft snapshot (display units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CraftTelemetry {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Rotation (radians, 0 = nose along +y)
    pub orientation: f32,
    pub angular_velocity: f32,
    /// Engine throttle (0.0 - 1.0)
    pub throttle: f32,
    pub engine_on: bool,
}

impl Default for CraftTelemetry {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            orientation: 0.0,
            angular_velocity: 0.0,
            throttle: LANDER_DEFAULT_THROTTLE,
            engine_on: false,
        }
    }
}

impl CraftTelemetry {
    /// Set throttle, clamped to [0, 1]
    pub fn set_throttle(&mut self, throttle: f32) -> Result<(), ConfigError> {
        if !throttle.is_finite() {
            return Err(ConfigError::InvalidCraft {
                name: "throttle",
                value: throttle,
            });
        }
        self.throttle = throttle.clamp(0.0, 1.0);
        Ok(())
    }

    /// Unit vector the engine pushes along
    #[inline]
    pub fn thrust_direction(&self) -> Vec2 {
        Vec2::from_angle(self.orientation + FRAC_PI_2)
    }
}

/// One rigid part of the craft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftComponent {
    pub name: String,
    /// kg
    pub mass: f32,
}

/// Static description of a craft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftSpec {
    /// Engine thrust at full throttle (N)
    pub max_thrust: f32,
    pub components: Vec<CraftComponent>,
}

impl Default for CraftSpec {
    fn default() -> Self {
        Self::moon_lander()
    }
}

impl CraftSpec {
    /// Body, nozzle and two landing legs
    pub fn moon_lander() -> Self {
        let part = |name: &str, mass: f32| CraftComponent {
            name: name.to_string(),
            mass,
        };
        Self {
            max_thrust: LANDER_MAX_THRUST,
            components: vec![
                part("body", 140.0),
                part("nozzle", 1.79),
                part("leg_left", 0.5),
                part("leg_right", 0.5),
            ],
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_thrust.is_finite() || self.max_thrust < 0.0 {
            return Err(ConfigError::InvalidCraft {
                name: "max_thrust",
                value: self.max_thrust,
            });
        }
        if let Some(bad) = self
            .components
            .iter()
            .find(|c| !c.mass.is_finite() || c.mass <= 0.0)
        {
            return Err(ConfigError::InvalidCraft {
                name: "component mass",
                value: bad.mass,
            });
        }
        Ok(())
    }

    pub fn total_mass(&self) -> f32 {
        self.components.iter().map(|c| c.mass).sum()
    }

    pub fn component(&self, name: &str) -> Option<&CraftComponent> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Engine force (N) for this frame; zero while the engine is off
pub fn thrust_force(craft: &CraftTelemetry, spec: &CraftSpec) -> Vec2 {
    if !craft.engine_on {
        return Vec2::ZERO;
    }
    craft.thrust_direction() * spec.max_thrust * craft.throttle.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_lander_mass() {
        let spec = CraftSpec::moon_lander();
        assert!((spec.total_mass() - 142.79).abs() < 1e-3);
        assert_eq!(spec.component("nozzle").map(|c| c.mass), Some(1.79));
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_thrust_off() {
        let craft = CraftTelemetry::default();
        assert_eq!(thrust_force(&craft, &CraftSpec::moon_lander()), Vec2::ZERO);
    }

    #[test]
    fn test_thrust_upright_and_rotated() {
        let spec = CraftSpec::moon_lander();
        let mut craft = CraftTelemetry {
            engine_on: true,
            ..Default::default()
        };
        let f = thrust_force(&craft, &spec);
        assert!(f.x.abs() < 1e-2);
        assert!((f.y - 45_000.0).abs() < 1e-1);

        // Nose tilted left by 90° pushes toward -x
        craft.orientation = PI / 2.0;
        craft.set_throttle(1.0).unwrap();
        let f = thrust_force(&craft, &spec);
        assert!((f.x + 90_000.0).abs() < 1e-1);
        assert!(f.y.abs() < 1e-1);
    }

    #[test]
    fn test_throttle_clamped() {
        let mut craft = CraftTelemetry::default();
        craft.set_throttle(3.0).unwrap();
        assert_eq!(craft.throttle, 1.0);
        craft.set_throttle(-1.0).unwrap();
        assert_eq!(craft.throttle, 0.0);
        assert!(craft.set_throttle(f32::NAN).is_err());
    }

    #[test]
    fn test_rejects_bad_mass() {
        let mut spec = CraftSpec::moon_lander();
        spec.components[0].mass = 0.0;
        assert!(spec.validate().is_err());
    }
}
